//! The capabilities a page needs from whatever is hosting it: element lookup by
//! id, the current location, and a one-shot "document ready" signal.

use log::debug;
use std::{cell::Cell, rc::Rc};

pub type ReadyCallback = Box<dyn FnOnce(&mut dyn Host)>;

pub trait Element {
    fn class_name(&self) -> &str;
    fn set_class_name(&mut self, class: &str);
    /// Replaces everything between the element's start and end tags.
    fn set_inner_html(&mut self, html: String);
}

pub trait Host {
    /// Path component of the current location, e.g. `/family/ganpati.html`.
    fn current_path(&self) -> &str;
    fn element_by_id(&mut self, id: &str) -> Option<&mut dyn Element>;
    /// Runs `callback` once the document structure has finished loading.
    fn on_ready(&mut self, callback: ReadyCallback);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Rendered,
}

/// One-shot initialisation of a renderer that needs its container to exist.
#[derive(Debug, Clone)]
pub struct Startup(Rc<Cell<Phase>>);

impl Startup {
    /// Renders right away when `container` is already there, otherwise waits for
    /// the host's ready signal and renders then.
    pub fn run<F>(host: &mut dyn Host, container: &str, render: F) -> Self
    where
        F: FnOnce(&mut dyn Host) + 'static,
    {
        let phase = Rc::new(Cell::new(Phase::Pending));
        if host.element_by_id(container).is_some() {
            render(host);
            phase.set(Phase::Rendered);
        } else {
            debug!("#{container} is not in the document yet, waiting for it to load");
            let deferred = Rc::clone(&phase);
            host.on_ready(Box::new(move |host: &mut dyn Host| {
                if deferred.get() == Phase::Pending {
                    render(host);
                    deferred.set(Phase::Rendered);
                }
            }));
        }
        Self(phase)
    }

    pub fn phase(&self) -> Phase {
        self.0.get()
    }
}
