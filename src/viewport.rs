use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::world::Viewport;

/// Host drawing surface the sprites live on.
pub trait Surface {
    /// Current usable size, or `None` while the surface is not mounted.
    fn size(&self) -> Option<(f32, f32)>;
}

type ResizeHandler = Box<dyn FnMut(Viewport)>;

#[derive(Default)]
struct Subscribers {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(u64, ResizeHandler)>>,
    /// Ids released while `handlers` was borrowed for dispatch.
    released: RefCell<Vec<u64>>,
}

impl Subscribers {
    fn remove(&self, id: u64) {
        match self.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.retain(|(hid, _)| *hid != id),
            Err(_) => self.released.borrow_mut().push(id),
        }
    }

    fn is_released(&self, id: u64) -> bool {
        self.released.borrow().contains(&id)
    }

    fn purge_released(&self) {
        let released = std::mem::take(&mut *self.released.borrow_mut());
        if !released.is_empty() {
            self.handlers
                .borrow_mut()
                .retain(|(id, _)| !released.contains(id));
        }
    }
}

/// Keeps a resize handler registered; dropping it unregisters the handler.
#[must_use = "dropping the subscription unregisters the handler"]
pub struct ResizeSubscription {
    subscribers: Weak<Subscribers>,
    id: u64,
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.remove(self.id);
        }
    }
}

/// Measures the drawing surface and tells subscribers when it changes size.
pub struct ViewportController<S> {
    surface: S,
    current: Viewport,
    subscribers: Rc<Subscribers>,
}

impl<S: Surface> ViewportController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: Viewport::ZERO,
            subscribers: Rc::new(Subscribers::default()),
        }
    }

    /// Read the surface now. Zero-area when it cannot be measured.
    pub fn measure(&mut self) -> Viewport {
        let bounds = match self.surface.size() {
            Some((w, h)) => Viewport::new(w, h),
            None => Viewport::ZERO,
        };
        if bounds.is_measurable() {
            self.current = bounds;
            bounds
        } else {
            Viewport::ZERO
        }
    }

    /// Last valid measurement.
    pub fn current(&self) -> Viewport {
        self.current
    }

    pub fn on_resize(&mut self, handler: impl FnMut(Viewport) + 'static) -> ResizeSubscription {
        let id = self.subscribers.next_id.get() + 1;
        self.subscribers.next_id.set(id);
        self.subscribers
            .handlers
            .borrow_mut()
            .push((id, Box::new(handler)));
        ResizeSubscription {
            subscribers: Rc::downgrade(&self.subscribers),
            id,
        }
    }

    /// Re-measure and notify subscribers if the size changed. Returns the
    /// new bounds when a resize was dispatched.
    pub fn poll(&mut self) -> Option<Viewport> {
        let previous = self.current;
        let bounds = self.measure();
        if !bounds.is_measurable() {
            debug!("surface not measurable, resize check skipped");
            return None;
        }
        if bounds == previous {
            return None;
        }

        debug!(width = bounds.width, height = bounds.height, "surface resized");
        match self.subscribers.handlers.try_borrow_mut() {
            Ok(mut handlers) => {
                for (id, handler) in handlers.iter_mut() {
                    if !self.subscribers.is_released(*id) {
                        handler(bounds);
                    }
                }
            }
            Err(_) => warn!("resize raised while already dispatching"),
        }
        self.subscribers.purge_released();
        Some(bounds)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.handlers.borrow().len()
    }
}

impl<S> Drop for ViewportController<S> {
    fn drop(&mut self) {
        if let Ok(mut handlers) = self.subscribers.handlers.try_borrow_mut() {
            handlers.clear();
        }
    }
}
