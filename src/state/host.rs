//! Collaborators injected into the store.
//!
//! The store never touches windows, files or processes directly. Host-level
//! presentation goes through [`Host`]; navigation goes through the two
//! [`Callbacks`] supplied at construction.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

// ===== HostClass =====

/// Host-level presentation classes toggled by effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostClass {
    /// Dark presentation.
    Dark,
    /// Sidebar expanded.
    SidebarOpen,
}

impl HostClass {
    /// Class name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostClass::Dark => "dark",
            HostClass::SidebarOpen => "sidebar-open",
        }
    }
}

// ===== IconName =====

/// The two fixed application icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconName {
    /// The "mark" icon.
    Mark,
    /// The classic icon.
    Classic,
}

impl IconName {
    /// Icon identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            IconName::Mark => "sleuth-icon-mark",
            IconName::Classic => "sleuth-icon",
        }
    }
}

impl fmt::Display for IconName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Host =====

/// Host window side effects. Side-effecting only; nothing flows back.
pub trait Host {
    /// Add or remove a presentation class.
    fn set_presentation_class(&mut self, class: HostClass, enabled: bool);

    /// Switch the application icon.
    fn set_icon(&mut self, icon: IconName);
}

/// Host that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl Host for NoopHost {
    fn set_presentation_class(&mut self, _class: HostClass, _enabled: bool) {}

    fn set_icon(&mut self, _icon: IconName) {}
}

/// Snapshot of what a [`SharedHost`] currently presents.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Active classes.
    pub classes: BTreeSet<HostClass>,
    /// Current icon, once set.
    pub icon: Option<IconName>,
    /// Number of `set_icon` calls seen.
    pub icon_changes: usize,
}

/// Host whose presentation is shared with a renderer through an `Rc`.
///
/// The store owns one clone; the view reads another to decide palette and
/// layout.
#[derive(Debug, Default, Clone)]
pub struct SharedHost {
    inner: Rc<RefCell<Presentation>>,
}

impl SharedHost {
    /// Create an empty presentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a class is active.
    pub fn has_class(&self, class: HostClass) -> bool {
        self.inner.borrow().classes.contains(&class)
    }

    /// Copy of the current presentation.
    pub fn snapshot(&self) -> Presentation {
        self.inner.borrow().clone()
    }
}

impl Host for SharedHost {
    fn set_presentation_class(&mut self, class: HostClass, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        if enabled {
            inner.classes.insert(class);
        } else {
            inner.classes.remove(&class);
        }
    }

    fn set_icon(&mut self, icon: IconName) {
        let mut inner = self.inner.borrow_mut();
        inner.icon = Some(icon);
        inner.icon_changes += 1;
    }
}

// ===== Callbacks =====

/// Navigation callbacks owned by the embedding shell.
///
/// Both are fire-and-forget notifications.
pub struct Callbacks {
    /// Start loading the given file or archive.
    pub open_file: Box<dyn FnMut(&Path)>,
    /// Navigate back to the home view.
    pub reset_app: Box<dyn FnMut()>,
}

impl Callbacks {
    /// Build from two closures.
    pub fn new(open_file: impl FnMut(&Path) + 'static, reset_app: impl FnMut() + 'static) -> Self {
        Self {
            open_file: Box::new(open_file),
            reset_app: Box::new(reset_app),
        }
    }

    /// Callbacks that do nothing.
    pub fn noop() -> Self {
        Self::new(|_| {}, || {})
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}
