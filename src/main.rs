use iced::task;
use iced::widget::{button, center, column, container, image, opaque, row, scrollable, stack, text, text_input};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use iced_aw::Wrap;
use rfd::AsyncFileDialog;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod media;
mod settings;
mod state;
mod ui;

use api::{ApiClient, ApiError};
use media::{CompressionOptions, EncodedImage, ImageFile, MediaError};
use settings::Settings;
use state::catalog::{Catalog, FetchOutcome};
use state::data::DrawPage;
use state::debounce::{Debouncer, Ticket};
use state::form::{DrawForm, Upload, UploadOutcome};
use state::preview::Previews;
use state::toast::{Toast, Toasts, LONG_TIMEOUT};

/// Main application state
struct DrawCatalog {
    /// Shared HTTP client for every backend call
    client: ApiClient,
    /// Page, search term and records currently shown
    catalog: Catalog,
    /// Raw vs settled search text
    search: Debouncer,
    /// Timer for the pending search update; aborted when dropped
    search_timer: Option<task::Handle>,
    /// Card thumbnails for the records on screen
    previews: Previews,
    /// "New drawing" modal
    form: DrawForm,
    form_open: bool,
    toasts: Toasts,
    compression: CompressionOptions,
    refresh_interval: std::time::Duration,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Search box edited
    SearchChanged(String),
    /// Debounce delay elapsed for a ticket
    SearchSettled(Ticket),
    NextPage,
    PreviousPage,
    /// Background refresh timer fired
    RefreshTick,
    /// A page request completed (sequence number, result)
    DrawsFetched(u64, Result<DrawPage, ApiError>),
    /// A card thumbnail finished loading (record id, load token, result)
    PreviewLoaded(String, u64, Result<image::Handle, MediaError>),

    OpenForm,
    CloseForm,
    KindChanged(String),
    ClientNameChanged(String),
    ClientAddressChanged(String),
    /// User clicked "Choose image..."
    PickImage,
    /// File dialog closed (None = cancelled)
    ImagePicked(Option<PathBuf>),
    /// Background compression finished for an upload ticket
    ImageCompressed(Upload, Result<EncodedImage, MediaError>),
    Submit,
    Created(Result<String, ApiError>),

    Delete(String),
    Deleted(String, Result<String, ApiError>),

    DownloadImage(String),
    ImageSaved(Result<Option<PathBuf>, MediaError>),

    DismissToast(u64),
}

impl DrawCatalog {
    /// Create a new instance of the application and load the first page
    fn new(settings: Settings, client: ApiClient) -> (Self, Task<Message>) {
        let mut app = DrawCatalog {
            client,
            catalog: Catalog::new(),
            search: Debouncer::new(settings.search_debounce()),
            search_timer: None,
            previews: Previews::default(),
            form: DrawForm::default(),
            form_open: false,
            toasts: Toasts::default(),
            compression: settings.image,
            refresh_interval: settings.refresh_interval(),
        };

        let initial = app.fetch();
        (app, initial)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SearchChanged(value) => {
                // Drop the previous timer before arming a new one
                self.search.cancel();
                self.search_timer = None;

                let ticket = self.search.schedule(value);
                let delay = self.search.delay();
                let (timer, handle) = Task::perform(tokio::time::sleep(delay), move |_| {
                    Message::SearchSettled(ticket)
                })
                .abortable();
                self.search_timer = Some(handle.abort_on_drop());

                timer
            }
            Message::SearchSettled(ticket) => {
                self.search_timer = None;

                let changed = match self.search.settle(ticket) {
                    Some(term) => self.catalog.set_search(term),
                    None => false,
                };

                if changed {
                    self.fetch()
                } else {
                    Task::none()
                }
            }
            Message::NextPage => {
                if self.catalog.next_page() {
                    self.fetch()
                } else {
                    Task::none()
                }
            }
            Message::PreviousPage => {
                if self.catalog.previous_page() {
                    self.fetch()
                } else {
                    Task::none()
                }
            }
            Message::RefreshTick => self.fetch(),
            Message::DrawsFetched(seq, result) => {
                if self.catalog.apply_fetch(seq, result) == FetchOutcome::Applied {
                    self.load_previews()
                } else {
                    Task::none()
                }
            }
            Message::PreviewLoaded(id, token, result) => {
                self.previews.finish(&id, token, result);
                Task::none()
            }

            Message::OpenForm => {
                self.form_open = true;
                Task::none()
            }
            Message::CloseForm => {
                self.form.reset();
                self.form_open = false;
                Task::none()
            }
            Message::KindChanged(value) => {
                self.form.kind = value;
                Task::none()
            }
            Message::ClientNameChanged(value) => {
                self.form.client_name = value;
                Task::none()
            }
            Message::ClientAddressChanged(value) => {
                self.form.client_address = value;
                Task::none()
            }
            Message::PickImage => Task::perform(pick_image(), Message::ImagePicked),
            Message::ImagePicked(None) => Task::none(),
            Message::ImagePicked(Some(path)) => {
                let mime = media::compress::mime_for_path(&path);
                if let Err(err) = media::ensure_image(&mime) {
                    warn!(path = %path.display(), %mime, "rejected non-image upload");
                    return self.notify(Toast::error(err.to_string()).with_timeout(LONG_TIMEOUT));
                }

                let upload = self.form.begin_upload();
                let options = self.compression;
                Task::perform(
                    async move {
                        let file = ImageFile::read(path).await?;
                        media::compress_image(file, options).await
                    },
                    move |result| Message::ImageCompressed(upload, result),
                )
            }
            Message::ImageCompressed(upload, result) => {
                match self.form.finish_upload(upload, result) {
                    UploadOutcome::Attached => Task::none(),
                    UploadOutcome::Stale => {
                        info!("Discarding compression result from an earlier pick");
                        Task::none()
                    }
                    UploadOutcome::Failed(MediaError::Validation) => self.notify(
                        Toast::error(MediaError::Validation.to_string()).with_timeout(LONG_TIMEOUT),
                    ),
                    UploadOutcome::Failed(err) => {
                        // Compression problems are not fatal: no image, no toast
                        error!(error = %err, "image compression failed");
                        Task::none()
                    }
                }
            }
            Message::Submit => {
                if !self.form.can_submit(self.catalog.is_busy()) {
                    return Task::none();
                }

                let payload = match self.form.validate() {
                    Ok(payload) => payload,
                    Err(err) => {
                        return self.notify(Toast::error(err.to_string()).with_timeout(LONG_TIMEOUT))
                    }
                };

                if !self.catalog.begin_mutation() {
                    return Task::none();
                }

                let client = self.client.clone();
                Task::perform(
                    async move { client.add_draw(&payload).await },
                    Message::Created,
                )
            }
            Message::Created(result) => {
                let outcome = self.catalog.finish_create(result);

                if outcome.succeeded {
                    self.form.reset();
                    self.form_open = false;
                }

                let mut tasks = vec![self.notify(outcome.toast)];
                if outcome.refetch {
                    tasks.push(self.fetch());
                }
                Task::batch(tasks)
            }

            Message::Delete(id) => {
                if !self.catalog.begin_mutation() {
                    return Task::none();
                }

                let client = self.client.clone();
                Task::perform(
                    async move {
                        let result = client.delete_draw(&id).await;
                        (id, result)
                    },
                    |(id, result)| Message::Deleted(id, result),
                )
            }
            Message::Deleted(id, result) => {
                let outcome = self.catalog.finish_delete(&id, result);
                if outcome.succeeded {
                    self.previews.remove(&id);
                }
                self.notify(outcome.toast)
            }

            Message::DownloadImage(id) => {
                let Some(draw) = self.catalog.find(&id) else {
                    return Task::none();
                };

                Task::perform(
                    media::download::save_draw_image(self.client.clone(), id, draw.image.clone()),
                    Message::ImageSaved,
                )
            }
            Message::ImageSaved(Ok(_)) => Task::none(),
            Message::ImageSaved(Err(err)) => {
                error!(error = %err, "failed to save image");
                self.notify(Toast::error(err.to_string()))
            }

            Message::DismissToast(id) => {
                self.toasts.dismiss(id);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("Draw Catalog").size(32).width(Length::Fill),
            button(text("New drawing")).on_press(Message::OpenForm),
        ]
        .align_y(Alignment::Center);

        let search_input = text_input("Search drawings...", self.search.raw())
            .on_input(Message::SearchChanged)
            .padding(10)
            .width(Length::Fixed(384.0));
        let search_hint = text(if self.search.is_pending() { "Searching..." } else { "" }).size(12);
        let search = column![search_input, search_hint]
            .spacing(4)
            .align_x(Alignment::Center);

        let listing: Element<Message> = if self.catalog.is_fetching() {
            text("Loading...").into()
        } else if self.catalog.draws().is_empty() {
            if self.catalog.search().is_empty() {
                text("No drawings found").into()
            } else {
                text(format!("No drawings match \"{}\"", self.catalog.search())).into()
            }
        } else {
            let busy = self.catalog.is_busy();
            let cards = self
                .catalog
                .draws()
                .iter()
                .map(|draw| ui::card::draw_card(draw, self.previews.get(&draw.id), busy))
                .collect();

            Wrap::with_elements(cards)
                .spacing(24.0)
                .line_spacing(24.0)
                .into()
        };

        let content = column![
            header,
            ui::toast::toast_list(&self.toasts),
            search,
            ui::pagination::pagination(&self.catalog),
            listing,
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        let base = container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill);

        if self.form_open {
            stack![
                base,
                opaque(center(ui::form::draw_form(&self.form, self.catalog.is_busy()))),
            ]
            .into()
        } else {
            base.into()
        }
    }

    /// Periodic background refresh
    fn subscription(&self) -> Subscription<Message> {
        if self.refresh_interval.is_zero() {
            return Subscription::none();
        }
        iced::time::every(self.refresh_interval).map(|_| Message::RefreshTick)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }

    /// Issue a request for the current page and search term
    fn fetch(&mut self) -> Task<Message> {
        let request = self.catalog.begin_fetch();
        let seq = request.seq;
        let client = self.client.clone();

        Task::perform(
            async move { client.fetch_draws(request.page, &request.search).await },
            move |result| Message::DrawsFetched(seq, result),
        )
    }

    /// Show a toast and schedule its dismissal
    fn notify(&mut self, toast: Toast) -> Task<Message> {
        let (id, timeout) = self.toasts.push(toast);
        Task::perform(tokio::time::sleep(timeout), move |_| Message::DismissToast(id))
    }

    /// Start loading thumbnails the current page does not have yet
    fn load_previews(&mut self) -> Task<Message> {
        let tasks = self
            .previews
            .sync(self.catalog.draws())
            .into_iter()
            .map(|request| {
                let client = self.client.clone();
                let (id, token) = (request.id, request.token);
                Task::perform(
                    media::thumbnail::load_thumbnail(client, request.image),
                    move |result| {
                        Message::PreviewLoaded(id.clone(), token, result.map(image::Handle::from_bytes))
                    },
                )
            });

        Task::batch(tasks)
    }
}

/// Native file picker for the upload image
async fn pick_image() -> Option<PathBuf> {
    AsyncFileDialog::new()
        .set_title("Select drawing")
        .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"])
        .add_filter("All files", &["*"])
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draw_catalog=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Without settings and an HTTP client there is nothing to show
    let settings = Settings::load()
        .expect("Failed to load configuration. Check config.toml and DRAW_CATALOG_* variables.");
    let client = ApiClient::new(&settings).expect("Failed to create HTTP client");

    info!("🪚 Draw Catalog starting against {}", client.base_url());

    iced::application("Draw Catalog", DrawCatalog::update, DrawCatalog::view)
        .subscription(DrawCatalog::subscription)
        .theme(DrawCatalog::theme)
        .centered()
        .run_with(move || DrawCatalog::new(settings, client))
}
