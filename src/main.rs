mod api;
mod citations;
mod config;
mod conversation;
mod ingestion;
mod ui;

use anyhow::Context;
use iced::{
    widget::{button, column, container, row, scrollable, text},
    Element, Length, Task, Theme, Font, Subscription, Size,
    event::{self, Event as IcedEvent},
    window,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use api::{ApiClient, ApiError, ChatReply, UploadReceipt};
use config::Config;
use conversation::Conversation;
use ingestion::Ingestion;

const LOG_ENV: &str = "DOCUMIND_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::load();
    let client = ApiClient::with_config(&config.backend).context("failed to build HTTP client")?;
    tracing::info!(api_root = client.api_root(), skin = ?config.ui.skin, "starting DocuMind");

    let settings = window::Settings {
        size: Size::new(config.window.width as f32, config.window.height as f32),
        min_size: Some(Size::new(
            config.window.min_width as f32,
            config.window.min_height as f32,
        )),
        position: window::Position::Centered,
        ..Default::default()
    };

    iced::application("DocuMind Enterprise", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(settings)
        .default_font(Font::MONOSPACE)
        .run_with(move || App::new(config, client))
        .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Ingestion,
    Chat,
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    InputChanged(String),
    Submit,
    ChatReplied(Result<ChatReply, ApiError>),
    PathChanged(String),
    PathSubmitted,
    FileHovered,
    FilesHoveredLeft,
    FileDropped(PathBuf),
    Upload,
    Uploaded(Result<UploadReceipt, ApiError>),
}

struct App {
    config: Config,
    client: ApiClient,
    tab: Tab,
    conversation: Conversation,
    ingestion: Ingestion,
    path_input: String,
}

impl App {
    fn new(config: Config, client: ApiClient) -> (Self, Task<Message>) {
        let app = App {
            config,
            client,
            tab: Tab::Ingestion,
            conversation: Conversation::new(),
            ingestion: Ingestion::new(),
            path_input: String::new(),
        };

        (app, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.tab = tab;
                Task::none()
            }
            Message::InputChanged(value) => {
                self.conversation.set_input(value);
                Task::none()
            }
            Message::Submit => {
                let Some(prompt) = self.conversation.submit() else {
                    return Task::none();
                };

                let client = self.client.clone();
                Task::batch([
                    scrollable::snap_to(ui::chat_log_id(), scrollable::RelativeOffset::END),
                    Task::perform(
                        async move { client.submit_message(&prompt).await },
                        Message::ChatReplied,
                    ),
                ])
            }
            Message::ChatReplied(outcome) => {
                self.conversation.resolve(outcome);
                scrollable::snap_to(ui::chat_log_id(), scrollable::RelativeOffset::END)
            }
            Message::PathChanged(value) => {
                self.path_input = value;
                Task::none()
            }
            Message::PathSubmitted => {
                let path = self.path_input.trim();
                if path.is_empty() {
                    return Task::none();
                }
                self.ingestion.select_path(path);
                Task::none()
            }
            Message::FileHovered => {
                self.ingestion.drag_enter();
                Task::none()
            }
            Message::FilesHoveredLeft => {
                self.ingestion.drag_leave();
                Task::none()
            }
            Message::FileDropped(path) => {
                // Drops land in the ingestion slot whichever tab is showing.
                self.tab = Tab::Ingestion;
                self.path_input = path.display().to_string();
                self.ingestion.select_path(path);
                Task::none()
            }
            Message::Upload => {
                let Some(file) = self.ingestion.begin_upload() else {
                    return Task::none();
                };

                let client = self.client.clone();
                Task::perform(
                    async move { client.submit_document(&file).await },
                    Message::Uploaded,
                )
            }
            Message::Uploaded(outcome) => {
                self.ingestion.resolve(outcome);
                if self.ingestion.file().is_none() {
                    self.path_input.clear();
                }
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _id| match event {
            IcedEvent::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
            IcedEvent::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
            IcedEvent::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    fn view(&self) -> Element<Message> {
        let skin = self.config.ui.skin;

        let tab_button = |label: &'static str, tab: Tab| {
            button(text(label).size(14))
                .on_press(Message::TabSelected(tab))
                .padding(10)
                .style(if self.tab == tab {
                    button::primary as fn(&Theme, button::Status) -> button::Style
                } else {
                    button::secondary
                })
        };

        let header = row![
            column![
                text("DocuMind Enterprise").size(20),
                text("Secure RAG Environment").size(12),
            ],
            iced::widget::horizontal_space(),
            tab_button("Ingestion", Tab::Ingestion),
            tab_button("Chat Agent", Tab::Chat),
        ]
        .spacing(8)
        .padding(12);

        let body = match self.tab {
            Tab::Ingestion => container(ui::upload(
                &self.ingestion,
                skin,
                &self.config.ui.accepted_extensions,
                &self.path_input,
            ))
            .center_x(Length::Fill),
            Tab::Chat => container(ui::chat(
                &self.conversation,
                skin,
                self.config.ui.snippet_width,
            )),
        };

        column![header, body.width(Length::Fill).height(Length::Fill)]
            .into()
    }

    fn theme(&self) -> Theme {
        self.config.ui.skin.theme()
    }
}
