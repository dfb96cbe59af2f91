use fltk::{
    button::Button,
    enums::Color,
    frame::Frame,
    prelude::*,
    window::Window,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub selection: Color,
    pub correct: Color,
    pub incorrect: Color,
}

pub fn palette(is_dark: bool) -> Palette {
    if is_dark {
        Palette {
            background: Color::from_rgb(25, 25, 25),
            surface: Color::from_rgb(40, 40, 40),
            text: Color::from_rgb(220, 220, 220),
            muted: Color::from_rgb(150, 150, 150),
            selection: Color::from_rgb(70, 70, 100),
            correct: Color::from_rgb(46, 110, 60),
            incorrect: Color::from_rgb(130, 45, 45),
        }
    } else {
        Palette {
            background: Color::from_rgb(240, 240, 240),
            surface: Color::White,
            text: Color::Black,
            muted: Color::from_rgb(100, 100, 100),
            selection: Color::from_rgb(173, 216, 230),
            correct: Color::from_rgb(170, 225, 175),
            incorrect: Color::from_rgb(240, 170, 170),
        }
    }
}

/// Widgets whose colors follow the theme store.
#[derive(Clone)]
pub struct Themed {
    pub window: Window,
    pub frames: Vec<Frame>,
    pub buttons: Vec<Button>,
}

pub fn apply_theme(themed: &mut Themed, is_dark: bool) {
    let p = palette(is_dark);

    themed.window.set_color(p.background);
    themed.window.set_label_color(p.text);

    for frame in themed.frames.iter_mut() {
        frame.set_color(p.background);
        frame.set_label_color(p.text);
        frame.redraw();
    }

    for button in themed.buttons.iter_mut() {
        button.set_color(p.surface);
        button.set_label_color(p.text);
        button.set_selection_color(p.selection);
        button.redraw();
    }

    themed.window.redraw();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_differ() {
        let light = palette(false);
        let dark = palette(true);
        assert_ne!(light.background, dark.background);
        assert_ne!(light.text, dark.text);
        assert_ne!(dark.correct, dark.incorrect);
    }
}
