/// A single drawing in the grid: image, type, client, actions
use iced::widget::{button, column, container, image, row, text};
use iced::{ContentFit, Element, Length};

use crate::state::data::Draw;
use crate::Message;

const CARD_WIDTH: f32 = 320.0;
const IMAGE_HEIGHT: f32 = 224.0;

pub fn draw_card<'a>(
    draw: &'a Draw,
    preview: Option<&image::Handle>,
    busy: bool,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(IMAGE_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("No preview"))
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(IMAGE_HEIGHT))
            .center_x(Length::Fixed(CARD_WIDTH))
            .center_y(Length::Fixed(IMAGE_HEIGHT))
            .into(),
    };

    let delete_label = if busy { "Deleting..." } else { "Delete" };
    let actions = row![
        button(text("Download image")).on_press(Message::DownloadImage(draw.id.clone())),
        button(text(delete_label))
            .style(button::danger)
            .on_press_maybe((!busy).then(|| Message::Delete(draw.id.clone()))),
    ]
    .spacing(8);

    let details = column![
        text(draw.kind.as_str()).size(20),
        text("Client").size(14),
        text(draw.client.name.as_str()),
        text("Address").size(14),
        text(draw.client.address.as_str()),
        actions,
    ]
    .spacing(4)
    .padding(16);

    container(column![picture, details])
        .width(Length::Fixed(CARD_WIDTH))
        .style(container::bordered_box)
        .into()
}
