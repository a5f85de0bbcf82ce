use super::Handle;
use crate::error::{CallbackError, Result};
use crate::event::{ElementEvent, EventFilter, EventKind};
use crate::registry::SubscriptionId;

/// Direction the element was flipped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flip {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayImage {
    Inbox,
    Happy,
    Sad,
    Heart,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayLine {
    One,
    Two,
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayColor {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    ShowImage(DisplayImage),
    Clear,
    ShowText {
        line: DisplayLine,
        alignment: TextAlignment,
        text: String,
    },
    SetFontSize(FontSize),
    SetTextColor(DisplayColor),
    PaintBackground(DisplayColor),
}

/// Display element.
#[derive(Clone)]
pub struct Display(pub(super) Handle);

impl Display {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn on_double_tap(
        &self,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::DoubleTap, EventFilter::Any, callback)
    }

    pub fn on_flip(
        &self,
        flip: Flip,
        callback: impl Fn(&ElementEvent) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.0
            .subscribe(EventKind::Flip, EventFilter::value(flip), callback)
    }

    pub async fn show_image(&self, image: DisplayImage) -> Result<()> {
        self.0.ack(DisplayCommand::ShowImage(image)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.0.ack(DisplayCommand::Clear).await
    }

    pub async fn show_text(
        &self,
        line: DisplayLine,
        alignment: TextAlignment,
        text: impl Into<String>,
    ) -> Result<()> {
        self.0
            .ack(DisplayCommand::ShowText {
                line,
                alignment,
                text: text.into(),
            })
            .await
    }

    pub async fn set_font_size(&self, size: FontSize) -> Result<()> {
        self.0.ack(DisplayCommand::SetFontSize(size)).await
    }

    pub async fn set_text_color(&self, color: DisplayColor) -> Result<()> {
        self.0.ack(DisplayCommand::SetTextColor(color)).await
    }

    pub async fn paint_background(&self, color: DisplayColor) -> Result<()> {
        self.0.ack(DisplayCommand::PaintBackground(color)).await
    }
}
