use fltk::{
    app::Sender,
    button::Button,
    enums::{Align, FrameType},
    frame::Frame,
    group::{Flex, FlexType},
    prelude::*,
    window::Window,
};

use crate::app::controllers::deck::CHOICE_COUNT;
use crate::app::domain::messages::Message;

pub struct MainWidgets {
    pub wind: Window,
    pub status: Frame,
    pub headline: Frame,
    pub meaning: Frame,
    pub choices: Vec<Button>,
    pub prev: Button,
    pub flip: Button,
    pub next: Button,
    pub annotation_toggle: Button,
    pub theme_toggle: Button,
}

fn flat_frame(label_size: i32) -> Frame {
    let mut frame = Frame::default();
    frame.set_frame(FrameType::FlatBox);
    frame.set_label_size(label_size);
    frame.set_align(Align::Center | Align::Inside | Align::Wrap);
    frame
}

/// Buttons never take keyboard focus, so Space and the arrows always reach
/// the window's key handler.
fn button(label: &str) -> Button {
    let mut b = Button::default().with_label(label);
    b.clear_visible_focus();
    b
}

fn send_on_click(b: &mut Button, sender: &Sender<Message>, message: Message) {
    let s = *sender;
    b.set_callback(move |_| s.send(message.clone()));
}

pub fn build_main_window(sender: &Sender<Message>) -> MainWidgets {
    let mut wind = Window::new(100, 100, 560, 480, "CantoCards");
    wind.set_xclass("CantoCards");

    let mut flex = Flex::new(0, 0, 560, 480, None);
    flex.set_type(FlexType::Column);
    flex.set_margin(12);
    flex.set_pad(8);

    let mut status = flat_frame(13);
    flex.fixed(&status, 24);
    status.set_align(Align::Left | Align::Inside);

    let headline = flat_frame(48);

    let meaning = flat_frame(18);
    flex.fixed(&meaning, 40);

    let mut choice_row = Flex::default();
    choice_row.set_type(FlexType::Row);
    choice_row.set_pad(6);
    let mut choices = Vec::with_capacity(CHOICE_COUNT);
    for i in 0..CHOICE_COUNT {
        let mut b = button("");
        send_on_click(&mut b, sender, Message::Pick(i));
        choices.push(b);
    }
    choice_row.end();
    flex.fixed(&choice_row, 48);

    let mut nav_row = Flex::default();
    nav_row.set_type(FlexType::Row);
    nav_row.set_pad(6);
    let mut prev = button("@< Prev");
    let mut flip = button("Flip");
    let mut next = button("Next @>");
    send_on_click(&mut prev, sender, Message::PrevCard);
    send_on_click(&mut flip, sender, Message::FlipCard);
    send_on_click(&mut next, sender, Message::NextCard);
    nav_row.end();
    flex.fixed(&nav_row, 36);

    let mut toggle_row = Flex::default();
    toggle_row.set_type(FlexType::Row);
    toggle_row.set_pad(6);
    let annotation_toggle = button("");
    let theme_toggle = button("");
    toggle_row.end();
    flex.fixed(&toggle_row, 36);

    flex.end();
    wind.resizable(&flex);
    wind.end();

    let s = *sender;
    wind.set_callback(move |_| s.send(Message::WindowClose));

    MainWidgets {
        wind,
        status,
        headline,
        meaning,
        choices,
        prev,
        flip,
        next,
        annotation_toggle,
        theme_toggle,
    }
}
