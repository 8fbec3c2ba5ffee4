/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures matching the API contract (data.rs)
/// - The catalog controller: page, search, records, mutations (catalog.rs)
/// - Debounced search input (debounce.rs)
/// - The "new drawing" form and its pending image (form.rs)
/// - Card thumbnails for the current page (preview.rs)
/// - Transient notifications (toast.rs)

pub mod catalog;
pub mod data;
pub mod debounce;
pub mod form;
pub mod preview;
pub mod toast;
