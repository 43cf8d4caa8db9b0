//! The page-wide dialog: one mount point, many owners.
//!
//! Rows and jobs each own a [`DialogOwner`]. Opening makes that owner the
//! single visible one on the [`ModalHost`]; dismissing the dialog sends
//! one event over the [`DismissBus`] and every subscribed owner resets.

use crate::error::WidgetError;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info};

pub type OwnerId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalContent {
    /// Single-field form posting `new_name` to `action`.
    Rename {
        action: String,
        current_name: String,
        new_name: String,
    },
    Log {
        title: String,
        text: String,
    },
}

impl ModalContent {
    pub fn rename(action: &str, current_name: &str) -> Self {
        ModalContent::Rename {
            action: action.to_string(),
            current_name: current_name.to_string(),
            new_name: current_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalRequest {
    pub owner: OwnerId,
    pub content: ModalContent,
}

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Broadcasts "the dialog was dismissed" to every live subscriber.
#[derive(Clone, Default)]
pub struct DismissBus {
    inner: Rc<RefCell<BusInner>>,
}

impl DismissBus {
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Notify every subscriber once. Returns how many were notified.
    pub fn emit(&self) -> usize {
        // Listeners run outside the borrow so they may (un)subscribe.
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Keeps a listener registered on its [`DismissBus`] until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    bus: Weak<RefCell<BusInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

/// The page's single dialog mount point and the request rendered into it.
pub struct ModalHost {
    mount: Option<String>,
    visible: Option<ModalRequest>,
    bus: DismissBus,
}

impl ModalHost {
    /// A host whose page has not provided a mount point yet.
    pub fn unmounted() -> Self {
        ModalHost {
            mount: None,
            visible: None,
            bus: DismissBus::default(),
        }
    }

    pub fn with_mount(mount: impl Into<String>) -> Self {
        let mut host = Self::unmounted();
        host.attach_mount(mount);
        host
    }

    pub fn attach_mount(&mut self, mount: impl Into<String>) {
        self.mount = Some(mount.into());
    }

    pub fn bus(&self) -> &DismissBus {
        &self.bus
    }

    /// Render `request` into the mount point, replacing whatever was there.
    pub fn open(&mut self, request: ModalRequest) -> Result<(), WidgetError> {
        let Some(mount) = self.mount.as_deref() else {
            return Err(WidgetError::MissingMount {
                owner: request.owner,
            });
        };
        if let Some(previous) = &self.visible {
            debug!(previous = %previous.owner, next = %request.owner, "dialog taken over");
        }
        info!(owner = %request.owner, mount, "dialog opened");
        self.visible = Some(request);
        Ok(())
    }

    pub fn visible(&self) -> Option<&ModalRequest> {
        self.visible.as_ref()
    }

    pub fn visible_content_mut(&mut self) -> Option<&mut ModalContent> {
        self.visible.as_mut().map(|r| &mut r.content)
    }

    pub fn is_visible_owner(&self, owner: &str) -> bool {
        self.visible.as_ref().is_some_and(|r| r.owner == owner)
    }

    /// Close the dialog. Emits the dismissal event once if a dialog was
    /// showing; a dismiss with nothing visible is a no-op.
    pub fn dismiss(&mut self) -> Option<ModalRequest> {
        let closed = self.visible.take()?;
        let notified = self.bus.emit();
        info!(owner = %closed.owner, notified, "dialog dismissed");
        Some(closed)
    }
}

/// Owner-side half of the dialog contract: a local `open` flag that is
/// cleared by every dismissal for as long as the owner is alive.
pub struct DialogOwner {
    id: OwnerId,
    open: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl DialogOwner {
    /// Subscribe a new owner to `host`'s dismissal events.
    pub fn mount(id: impl Into<OwnerId>, host: &ModalHost) -> Self {
        let open = Rc::new(Cell::new(false));
        let flag = Rc::clone(&open);
        let subscription = host.bus().subscribe(move || flag.set(false));
        let id = id.into();
        debug!(
            owner = %id,
            subscribers = host.bus().subscriber_count(),
            "dialog owner mounted"
        );
        DialogOwner {
            id,
            open,
            _subscription: subscription,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Ask `host` to show `content` for this owner. The local flag is set
    /// only once the host accepted the request.
    pub fn request(&self, host: &mut ModalHost, content: ModalContent) -> Result<(), WidgetError> {
        host.open(ModalRequest {
            owner: self.id.clone(),
            content,
        })?;
        self.open.set(true);
        Ok(())
    }

    /// Whether this owner's content is what the mount point shows now.
    /// A stale `open` flag alone never makes an owner visible.
    pub fn is_showing(&self, host: &ModalHost) -> bool {
        self.is_open() && host.is_visible_owner(&self.id)
    }
}

impl std::fmt::Debug for DialogOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogOwner")
            .field("id", &self.id)
            .field("open", &self.open.get())
            .finish()
    }
}
