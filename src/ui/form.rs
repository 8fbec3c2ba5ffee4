/// The "New drawing" modal content
use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::state::form::DrawForm;
use crate::Message;

pub fn draw_form(form: &DrawForm, busy: bool) -> Element<'_, Message> {
    let image_status = match (&form.image, form.compressing) {
        (_, true) => "Compressing...".to_string(),
        (Some(image), false) => format!(
            "{} ({}x{}, {} KB)",
            image.name,
            image.width,
            image.height,
            image.byte_len / 1024
        ),
        (None, false) => "No image selected".to_string(),
    };

    let save_label = if busy { "Loading..." } else { "Save" };

    let content = column![
        text("Add new drawing").size(24),
        text("Furniture type"),
        text_input("Type here", &form.kind).on_input(Message::KindChanged),
        text("Client name"),
        text_input("Type here", &form.client_name).on_input(Message::ClientNameChanged),
        text("Client address"),
        text_input("Type here", &form.client_address).on_input(Message::ClientAddressChanged),
        text("Drawing"),
        row![
            button(text("Choose image..."))
                .on_press_maybe((!form.compressing).then_some(Message::PickImage)),
            text(image_status).size(14),
        ]
        .spacing(10)
        .align_y(Alignment::Center),
        row![
            button(text("Cancel"))
                .style(button::secondary)
                .on_press(Message::CloseForm),
            button(text(save_label))
                .style(button::success)
                .on_press_maybe(form.can_submit(busy).then_some(Message::Submit)),
        ]
        .spacing(10),
    ]
    .spacing(10)
    .padding(24)
    .width(Length::Fixed(420.0));

    container(content).style(container::rounded_box).into()
}
