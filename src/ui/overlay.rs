//! Artwork information overlay and the Prev / Next navigation buttons

use imgui::{Condition, Ui, WindowFlags};

/// Text shown for one artwork
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtworkCard {
    pub title: String,
    /// "By {artist}"
    pub byline: String,
    pub description: String,
    pub year: String,
    pub medium: String,
}

/// Something that can present artwork details to the visitor
pub trait InfoDisplay {
    /// Replaces the displayed details and makes the display visible
    fn show(&mut self, card: ArtworkCard);
    fn is_visible(&self) -> bool;
}

/// Navigation requested through the overlay buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    Prev,
    Next,
}

impl NavRequest {
    pub fn direction(self) -> i64 {
        match self {
            NavRequest::Prev => -1,
            NavRequest::Next => 1,
        }
    }
}

const GOLD_TEXT: [f32; 4] = [0.84, 0.72, 0.45, 1.0];
const MUTED_TEXT: [f32; 4] = [0.75, 0.75, 0.75, 1.0];

/// ImGui rendition of the artwork details panel
#[derive(Debug, Default)]
pub struct ArtworkOverlay {
    card: Option<ArtworkCard>,
}

impl InfoDisplay for ArtworkOverlay {
    fn show(&mut self, card: ArtworkCard) {
        self.card = Some(card);
    }

    fn is_visible(&self) -> bool {
        self.card.is_some()
    }
}

impl ArtworkOverlay {
    pub fn card(&self) -> Option<&ArtworkCard> {
        self.card.as_ref()
    }

    /// Draws the panel (when visible) and the navigation buttons
    pub fn draw(&self, ui: &Ui, display_size: [f32; 2]) -> Option<NavRequest> {
        let [width, height] = display_size;
        let panel_flags = WindowFlags::NO_DECORATION
            | WindowFlags::NO_MOVE
            | WindowFlags::NO_SAVED_SETTINGS
            | WindowFlags::ALWAYS_AUTO_RESIZE;

        if let Some(card) = &self.card {
            ui.window("Artwork Details")
                .position([24.0, height - 24.0], Condition::Always)
                .position_pivot([0.0, 1.0])
                .size_constraints([260.0, 0.0], [width * 0.35, height * 0.6])
                .bg_alpha(0.7)
                .flags(panel_flags)
                .build(|| {
                    ui.text_colored(GOLD_TEXT, &card.title);
                    ui.text(&card.byline);
                    ui.separator();
                    if !card.description.is_empty() {
                        ui.text_wrapped(&card.description);
                    }
                    ui.text_colored(MUTED_TEXT, &card.year);
                    ui.text_colored(MUTED_TEXT, &card.medium);
                });
        }

        ui.window("Navigation")
            .position([width * 0.5, height - 24.0], Condition::Always)
            .position_pivot([0.5, 1.0])
            .bg_alpha(0.0)
            .flags(panel_flags)
            .build(|| {
                let mut request = None;
                if ui.button("Prev") {
                    request = Some(NavRequest::Prev);
                }
                ui.same_line();
                if ui.button("Next") {
                    request = Some(NavRequest::Next);
                }
                request
            })
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_hidden_until_shown() {
        let mut overlay = ArtworkOverlay::default();
        assert!(!overlay.is_visible());
        overlay.show(ArtworkCard {
            title: "Ethereal Dreams".to_string(),
            byline: "By Maria Santos".to_string(),
            ..Default::default()
        });
        assert!(overlay.is_visible());
        assert_eq!(overlay.card().unwrap().byline, "By Maria Santos");
    }

    #[test]
    fn test_nav_directions() {
        assert_eq!(NavRequest::Prev.direction(), -1);
        assert_eq!(NavRequest::Next.direction(), 1);
    }
}
