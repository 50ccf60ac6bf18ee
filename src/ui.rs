use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{alignment, font, Border, Color, Element, Font, Length, Theme};
use serde::{Deserialize, Serialize};

use crate::citations::{self, CitationGroup};
use crate::conversation::{self, ChatState, Conversation, Role};
use crate::ingestion::{Ingestion, Outcome, Phase};
use crate::Message;

const BOLD: Font = Font {
    weight: font::Weight::Bold,
    ..Font::MONOSPACE
};

const ITALIC: Font = Font {
    style: font::Style::Italic,
    ..Font::MONOSPACE
};

const SUCCESS: Color = Color::from_rgb(0.33, 0.75, 0.45);
const DANGER: Color = Color::from_rgb(0.93, 0.37, 0.40);
const MUTED: Color = Color::from_rgb(0.55, 0.58, 0.66);

/// Visual variant of the window. Both skins draw the same controller state
/// and emit the same messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Classic,
    Compact,
}

impl Skin {
    pub fn theme(self) -> Theme {
        match self {
            Skin::Classic => Theme::TokyoNight,
            Skin::Compact => Theme::Nord,
        }
    }

    fn text_size(self) -> u16 {
        match self {
            Skin::Classic => 16,
            Skin::Compact => 13,
        }
    }

    fn small_size(self) -> u16 {
        self.text_size() - 3
    }

    fn spacing(self) -> u16 {
        match self {
            Skin::Classic => 16,
            Skin::Compact => 6,
        }
    }

    fn padding(self) -> u16 {
        match self {
            Skin::Classic => 14,
            Skin::Compact => 6,
        }
    }

    fn bubble_width(self) -> f32 {
        match self {
            Skin::Classic => 620.0,
            Skin::Compact => 900.0,
        }
    }
}

pub fn chat_log_id() -> scrollable::Id {
    scrollable::Id::new("chat-log")
}

pub fn chat<'a>(conv: &'a Conversation, skin: Skin, snippet_width: usize) -> Element<'a, Message> {
    let mut log = Column::new().spacing(skin.spacing());
    for message in conv.messages() {
        log = log.push(bubble(message, skin, snippet_width));
    }
    if conv.state() == ChatState::Awaiting {
        log = log.push(
            text(match skin {
                Skin::Classic => "DocuMind is thinking...",
                Skin::Compact => "...",
            })
            .size(skin.small_size())
            .font(ITALIC)
            .color(MUTED),
        );
    }

    let log = scrollable(container(log).padding(skin.padding()).width(Length::Fill))
        .id(chat_log_id())
        .height(Length::Fill);

    let input = text_input("Type your query here...", conv.input())
        .on_input(Message::InputChanged)
        .on_submit(Message::Submit)
        .padding(skin.padding())
        .size(skin.text_size());

    let send = button(text("Send").size(skin.text_size()))
        .on_press_maybe(conv.can_submit().then_some(Message::Submit))
        .padding(skin.padding())
        .style(button::primary);

    column![log, row![input, send].spacing(8)]
        .spacing(skin.spacing())
        .padding(skin.padding())
        .into()
}

fn bubble<'a>(
    message: &'a conversation::Message,
    skin: Skin,
    snippet_width: usize,
) -> Element<'a, Message> {
    let (label, align) = match message.role() {
        Role::User => ("You", alignment::Horizontal::Right),
        Role::Assistant => ("DocuMind", alignment::Horizontal::Left),
    };

    let mut body = Column::new().spacing(6);
    body = match skin {
        Skin::Classic => body
            .push(text(label).size(skin.small_size()).font(BOLD))
            .push(text(message.content()).size(skin.text_size())),
        Skin::Compact => body.push(
            text(format!("{label}> {}", message.content())).size(skin.text_size()),
        ),
    };

    if let Some(group) = citations::present(message.citations(), snippet_width) {
        body = body.push(sources(group, skin));
    }

    let style: fn(&Theme) -> container::Style = match message.role() {
        Role::User => container::bordered_box,
        Role::Assistant => container::rounded_box,
    };
    let bubble = container(body)
        .padding(skin.padding())
        .max_width(skin.bubble_width())
        .style(style);

    container(bubble).width(Length::Fill).align_x(align).into()
}

fn sources<'a>(group: CitationGroup, skin: Skin) -> Element<'a, Message> {
    let mut list = Column::new().spacing(4);
    for card in group.cards {
        let snippet = text(format!("\"...{}...\"", card.snippet_preview))
            .size(skin.small_size())
            .font(ITALIC)
            .color(MUTED);

        list = match skin {
            Skin::Classic => list.push(
                container(
                    column![
                        row![
                            text(card.filename).size(skin.small_size()).font(BOLD),
                            iced::widget::horizontal_space(),
                            text(card.page_label).size(skin.small_size()),
                        ],
                        snippet,
                    ]
                    .spacing(2),
                )
                .padding(6)
                .width(Length::Fill)
                .style(container::bordered_box),
            ),
            Skin::Compact => list.push(
                column![
                    text(format!("[{}, {}]", card.filename, card.page_label)).size(skin.small_size()),
                    snippet,
                ]
                .spacing(2),
            ),
        };
    }

    column![
        text("SOURCES VERIFIED").size(skin.small_size()).font(BOLD).color(MUTED),
        list
    ]
    .spacing(6)
    .into()
}

pub fn upload<'a>(
    ing: &'a Ingestion,
    skin: Skin,
    accepted_extensions: &[String],
    path_input: &'a str,
) -> Element<'a, Message> {
    let phase = ing.phase();
    let dragging = phase == Phase::Dragging;
    let transferring = phase == Phase::Transferring;

    let accepted = accepted_extensions
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut path_field = text_input(&format!("Path to a document ({accepted})"), path_input)
        .padding(skin.padding())
        .size(skin.text_size());
    if !transferring {
        path_field = path_field
            .on_input(Message::PathChanged)
            .on_submit(Message::PathSubmitted);
    }
    let select = button(text("Select Document").size(skin.text_size()))
        .on_press_maybe((!transferring && !path_input.trim().is_empty()).then_some(Message::PathSubmitted))
        .padding(skin.padding())
        .style(button::secondary);

    let hint = if dragging {
        "Release to select this document".to_string()
    } else {
        format!("Drop a document onto the window, or enter its path ({accepted})")
    };

    let mut zone = column![
        text(hint).size(skin.text_size()),
        row![path_field, select].spacing(8),
    ]
    .spacing(skin.spacing())
    .align_x(alignment::Horizontal::Center);

    if let Some(file) = ing.file() {
        zone = zone.push(
            text(format!("Selected: {} ({}, {})", file.name, format_size(file.size), file.mime_type))
                .size(skin.small_size()),
        );
    }

    let drop_zone = container(zone)
        .padding(skin.padding() * 2)
        .width(Length::Fill)
        .style(move |theme: &Theme| {
            let palette = theme.extended_palette();
            container::Style {
                border: Border {
                    color: if dragging {
                        palette.primary.strong.color
                    } else {
                        palette.background.strong.color
                    },
                    width: 2.0,
                    radius: 8.0.into(),
                },
                ..container::Style::default()
            }
        });

    let label = if transferring {
        "Ingesting..."
    } else {
        "Start Ingestion Pipeline"
    };
    let start = button(
        container(text(label).size(skin.text_size()).font(BOLD))
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Center),
    )
    .on_press_maybe(ing.can_upload().then_some(Message::Upload))
    .width(Length::Fill)
    .padding(skin.padding())
    .style(button::primary);

    let mut content = column![drop_zone, start].spacing(skin.spacing());

    match ing.outcome() {
        Some(Outcome::Succeeded(receipt)) => {
            content = content.push(outcome_panel(
                "Ingestion Successful",
                vec![
                    receipt.message.clone(),
                    format!("Processed {} chunks.", receipt.chunks_processed),
                ],
                SUCCESS,
                skin,
            ));
        }
        Some(Outcome::Failed(detail)) => {
            content = content.push(outcome_panel(
                "Ingestion Failed",
                vec![detail.clone()],
                DANGER,
                skin,
            ));
        }
        None => {}
    }

    container(content)
        .padding(skin.padding())
        .max_width(640.0)
        .into()
}

fn outcome_panel<'a>(title: &'a str, lines: Vec<String>, color: Color, skin: Skin) -> Element<'a, Message> {
    let mut panel = column![text(title).size(skin.text_size()).font(BOLD).color(color)].spacing(4);
    for line in lines {
        panel = panel.push(text(line).size(skin.small_size()));
    }

    container(panel)
        .padding(skin.padding())
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

/// `2097152` -> `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
