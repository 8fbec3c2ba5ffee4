/// Notification stack rendered above the page content
use iced::widget::{button, container, row, text, Column};
use iced::{Alignment, Element};

use crate::state::toast::{ToastKind, Toasts};
use crate::Message;

pub fn toast_list(toasts: &Toasts) -> Element<'_, Message> {
    let items = toasts.iter().map(|(id, toast)| {
        let style = match toast.kind {
            ToastKind::Success => text::success,
            ToastKind::Error => text::danger,
        };

        container(
            row![
                text(toast.title.as_str()).style(style),
                button(text("×"))
                    .style(button::text)
                    .on_press(Message::DismissToast(*id)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
        .padding(8)
        .style(container::rounded_box)
        .into()
    });

    Column::with_children(items).spacing(6).into()
}
