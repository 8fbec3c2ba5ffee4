/// View helpers for the main window
///
/// Each function builds one piece of the widget tree from read-only state;
/// all interaction flows back through `crate::Message`.

pub mod card;
pub mod form;
pub mod pagination;
pub mod toast;
