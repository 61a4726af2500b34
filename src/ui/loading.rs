//! Full-window loading screen that fades out shortly after start

use std::time::Duration;

use imgui::{Condition, StyleVar, Ui, WindowFlags};

use crate::gallery::tween::{Easing, Tween};

const TITLE: &str = "Loading Gallery...";

#[derive(Debug, Clone)]
pub struct LoadingScreen {
    delay: f32,
    elapsed: f32,
    fade: Tween<f32>,
    visible: bool,
}

impl LoadingScreen {
    /// Fully opaque for `delay`, then fades out over `fade`
    pub fn new(delay: Duration, fade: Duration) -> Self {
        Self {
            delay: delay.as_secs_f32(),
            elapsed: 0.0,
            fade: Tween::new(1.0, 0.0, fade, Easing::Power2InOut),
            visible: true,
        }
    }

    pub fn update(&mut self, dt: Duration) {
        if !self.visible {
            return;
        }
        let dt = dt.as_secs_f32();
        let before = self.elapsed;
        self.elapsed += dt;
        if self.elapsed > self.delay {
            let fading = self.elapsed - before.max(self.delay);
            self.fade.advance(fading);
            if self.fade.is_finished() {
                self.visible = false;
            }
        }
    }

    pub fn opacity(&self) -> f32 {
        if self.visible {
            self.fade.value()
        } else {
            0.0
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn draw(&self, ui: &Ui, display_size: [f32; 2]) {
        if !self.visible {
            return;
        }
        let _alpha = ui.push_style_var(StyleVar::Alpha(self.opacity()));
        ui.window("Loading")
            .position([0.0, 0.0], Condition::Always)
            .size(display_size, Condition::Always)
            .bg_alpha(1.0)
            .flags(
                WindowFlags::NO_DECORATION
                    | WindowFlags::NO_MOVE
                    | WindowFlags::NO_SAVED_SETTINGS
                    | WindowFlags::NO_INPUTS,
            )
            .build(|| {
                let [w, h] = ui.calc_text_size(TITLE);
                ui.set_cursor_pos([
                    (display_size[0] - w) * 0.5,
                    (display_size[1] - h) * 0.5,
                ]);
                ui.text(TITLE);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(100);

    #[test]
    fn test_opaque_during_delay() {
        let mut screen = LoadingScreen::new(Duration::from_secs(2), Duration::from_secs(1));
        for _ in 0..19 {
            screen.update(FRAME);
        }
        assert!(screen.is_visible());
        assert!((screen.opacity() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fades_then_hides() {
        let mut screen = LoadingScreen::new(Duration::from_secs(2), Duration::from_secs(1));
        screen.update(Duration::from_millis(2500));
        assert!(screen.is_visible());
        assert!((screen.opacity() - 0.5).abs() < 1e-4);

        screen.update(Duration::from_millis(600));
        assert!(!screen.is_visible());
        assert_eq!(screen.opacity(), 0.0);
    }
}
