use std::cell::RefCell;

use super::*;
use crate::memory::MemorySurface;

fn applier() -> (Rc<MemorySurface>, ThemeApplier) {
    let surface = Rc::new(MemorySurface::default());
    let applier = ThemeApplier::new(surface.clone(), "data-theme", "themechange");
    (surface, applier)
}

#[test]
fn apply_sets_attribute_and_fires_one_event() {
    let (surface, applier) = applier();
    applier.apply(Theme::Light);
    assert_eq!(surface.attribute("data-theme"), Some(Theme::Light));
    assert_eq!(surface.events("themechange"), vec![Theme::Light]);
}

#[test]
fn apply_twice_is_idempotent_but_notifies_twice() {
    let (surface, applier) = applier();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    applier.set_callback(Some(Rc::new(move |theme: Theme| sink.borrow_mut().push(theme))));

    applier.apply(Theme::Dark);
    assert_eq!(surface.attribute("data-theme"), Some(Theme::Dark));
    applier.apply(Theme::Dark);
    assert_eq!(surface.attribute("data-theme"), Some(Theme::Dark));

    assert_eq!(surface.events("themechange"), vec![Theme::Dark, Theme::Dark]);
    assert_eq!(*calls.borrow(), vec![Theme::Dark, Theme::Dark]);
}

#[test]
fn set_callback_replaces_previous_callback() {
    let (_surface, applier) = applier();
    let first = Rc::new(RefCell::new(0));
    let second = Rc::new(RefCell::new(0));
    let a = first.clone();
    let b = second.clone();
    applier.set_callback(Some(Rc::new(move |_: Theme| *a.borrow_mut() += 1)));
    applier.set_callback(Some(Rc::new(move |_: Theme| *b.borrow_mut() += 1)));
    applier.apply(Theme::Light);
    assert_eq!(*first.borrow(), 0);
    assert_eq!(*second.borrow(), 1);
}

#[test]
fn callback_sees_attribute_already_painted() {
    let (surface, applier) = applier();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let probe = surface.clone();
    applier.set_callback(Some(Rc::new(move |_: Theme| *sink.borrow_mut() = probe.attribute("data-theme"))));
    applier.apply(Theme::Light);
    assert_eq!(*seen.borrow(), Some(Theme::Light));
}

#[test]
fn apply_without_callback_still_notifies() {
    let (surface, applier) = applier();
    applier.set_callback(None);
    applier.apply(Theme::Dark);
    assert_eq!(surface.events("themechange").len(), 1);
}
