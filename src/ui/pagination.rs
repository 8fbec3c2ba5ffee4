/// Previous / "Page N" / next controls
///
/// Previous is disabled on page 1; next is disabled when the backend
/// reported no further page.
use iced::widget::{button, row, text};
use iced::{Alignment, Element};

use crate::state::catalog::Catalog;
use crate::Message;

pub fn pagination(catalog: &Catalog) -> Element<'_, Message> {
    row![
        button(text("«")).on_press_maybe(catalog.can_go_previous().then_some(Message::PreviousPage)),
        text(format!("Page {}", catalog.page())).size(14),
        button(text("»")).on_press_maybe(catalog.can_go_next().then_some(Message::NextPage)),
    ]
    .spacing(24)
    .align_y(Alignment::Center)
    .into()
}
