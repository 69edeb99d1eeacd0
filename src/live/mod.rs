//! Live pagination of a continuously edited surface
//!
//! The controller remeasures every top-level block on each pass rather than
//! patching the previous result. Passes run at most once per debounce window
//! (`Idle -> Scheduled -> Recalculating -> Idle`) and never overlap: a trigger
//! arriving while a pass runs is dropped, and the next edit schedules a fresh
//! pass that catches up.
//!
//! Code running inside a pass (a surface whose `set_height` reports a resize
//! synchronously, or a subscriber that edits the document) reaches the
//! controller through a [`TriggerHandle`].

mod debounce;

pub use debounce::Debouncer;

use crate::config::PaginationConfig;
use crate::error::Result;
use crate::layout::{
    compute_page_breaks, paper_surface_height, BlockId, BufferPagePolicy, PageBreakSet,
    PageDimensions,
};
use crate::measure::{measure_block, BlockBox};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// A top-level block of the live surface
#[derive(Debug, Clone)]
pub struct SurfaceBlock<B> {
    pub id: BlockId,
    pub node: B,
}

/// The live editing surface being paginated
pub trait EditingSurface {
    type Block: BlockBox;

    /// Whether the surface is still mounted
    fn is_attached(&self) -> bool;

    /// Top-level blocks in document order
    fn top_level_blocks(&self) -> Result<Vec<SurfaceBlock<Self::Block>>>;

    /// Resize the surface container
    fn set_height(&mut self, height: f32) -> Result<()>;
}

/// What caused a pass to be scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Surface size changed (window resize, fonts or images loaded)
    Resize,
    /// Document subtree mutated
    Mutation,
}

/// Pass state shared with trigger handles
#[derive(Debug, Default)]
struct PassState {
    in_flight: Cell<bool>,
    raised: Cell<Option<Trigger>>,
}

/// Raises triggers from callbacks that cannot borrow the controller.
///
/// A trigger raised while a pass runs is dropped. Otherwise it is held in a
/// single slot until the controller's next `notify` or `poll`.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    state: Rc<PassState>,
}

impl TriggerHandle {
    /// Returns `false` when the trigger was dropped because a pass is running
    pub fn raise(&self, trigger: Trigger) -> bool {
        if self.state.in_flight.get() {
            trace!(?trigger, "pass in flight, trigger dropped");
            return false;
        }
        self.state.raised.set(Some(trigger));
        true
    }

    pub fn is_recalculating(&self) -> bool {
        self.state.in_flight.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerState {
    Idle,
    Scheduled { due_at: f64 },
    Recalculating,
}

/// Result of one recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Nothing ran: the surface is gone
    Skipped,
    /// Layout applied; break set membership unchanged
    Unchanged,
    /// Layout applied and a new break set published
    Published,
    /// Pass failed; previous layout kept
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&PageBreakSet)>;

/// Keeps page breaks and surface height in sync with a live surface
pub struct PaginationController<S> {
    surface: Option<S>,
    dimensions: PageDimensions,
    page_gap: f32,
    buffer_policy: BufferPagePolicy,
    debouncer: Debouncer,
    pass: Rc<PassState>,
    break_set: PageBreakSet,
    page_count: usize,
    surface_height: f32,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S: EditingSurface> PaginationController<S> {
    pub fn new(surface: S, config: &PaginationConfig) -> Self {
        Self {
            surface: Some(surface),
            dimensions: config.dimensions,
            page_gap: config.page_gap,
            buffer_policy: config.buffer_policy(),
            debouncer: Debouncer::new(config.debounce_ms),
            pass: Rc::new(PassState::default()),
            break_set: PageBreakSet::new(),
            page_count: 1,
            surface_height: paper_surface_height(1, config.dimensions.height, config.page_gap),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Handle for raising triggers from inside surface or subscriber callbacks
    pub fn trigger_handle(&self) -> TriggerHandle {
        TriggerHandle {
            state: Rc::clone(&self.pass),
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.pass.in_flight.get() {
            ControllerState::Recalculating
        } else if let Some(due_at) = self.debouncer.deadline() {
            ControllerState::Scheduled { due_at }
        } else {
            ControllerState::Idle
        }
    }

    /// Schedule a pass after the debounce delay.
    ///
    /// Re-arms any pending deadline. Returns `false` when the trigger was
    /// dropped because the surface is gone.
    pub fn notify(&mut self, trigger: Trigger, now_ms: f64) -> bool {
        self.pass.raised.take();
        if !self.is_attached() {
            trace!(?trigger, "surface detached, trigger dropped");
            return false;
        }

        let due_at = self.debouncer.schedule(now_ms);
        trace!(?trigger, due_at, "pagination pass scheduled");
        true
    }

    /// Run the scheduled pass if its deadline has passed.
    ///
    /// A trigger raised through a [`TriggerHandle`] since the last call is
    /// scheduled first, so it runs on a later poll.
    pub fn poll(&mut self, now_ms: f64) -> Option<PassOutcome> {
        if let Some(trigger) = self.pass.raised.take() {
            self.notify(trigger, now_ms);
        }
        if self.debouncer.is_due(now_ms) {
            Some(self.recalculate())
        } else {
            None
        }
    }

    /// Deadline of the scheduled pass, for hosts arming a timer
    pub fn next_deadline(&self) -> Option<f64> {
        self.debouncer.deadline()
    }

    /// Run a pass now, consuming any scheduled one
    pub fn recalculate(&mut self) -> PassOutcome {
        self.debouncer.cancel();
        self.pass.raised.take();
        self.pass.in_flight.set(true);
        let outcome = self.run_pass().unwrap_or_else(|err| {
            warn!(error = %err, "pagination pass failed, keeping previous layout");
            PassOutcome::Failed
        });
        self.pass.in_flight.set(false);

        outcome
    }

    fn run_pass(&mut self) -> Result<PassOutcome> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(PassOutcome::Skipped);
        };
        if !surface.is_attached() {
            debug!("surface detached before pass ran");
            return Ok(PassOutcome::Skipped);
        }

        let blocks = surface.top_level_blocks()?;
        let usable_height = self.dimensions.usable_height();

        let (break_set, page_count) = if blocks.is_empty() {
            (PageBreakSet::new(), 1)
        } else {
            let breaks = compute_page_breaks(
                blocks
                    .iter()
                    .map(|block| (block.id.clone(), measure_block(&block.node))),
                usable_height,
            );
            let pages = self.buffer_policy.surface_page_count(&breaks, usable_height);
            (PageBreakSet::from(breaks), pages)
        };

        let height = paper_surface_height(page_count, self.dimensions.height, self.page_gap);
        surface.set_height(height)?;
        self.page_count = page_count;
        self.surface_height = height;

        let diff = break_set.diff(&self.break_set);
        debug!(
            blocks = blocks.len(),
            pages = page_count,
            breaks = break_set.len(),
            changed = diff.change_count(),
            "pagination pass"
        );

        if diff.is_empty() {
            return Ok(PassOutcome::Unchanged);
        }

        self.break_set = break_set;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.break_set);
        }
        Ok(PassOutcome::Published)
    }

    /// Call `subscriber` whenever break set membership changes
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&PageBreakSet) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Release the surface: cancels the pending pass and drops subscribers
    pub fn detach(&mut self) -> Option<S> {
        self.debouncer.cancel();
        self.pass.raised.take();
        self.subscribers.clear();
        let surface = self.surface.take();
        if surface.is_some() {
            debug!("pagination controller detached");
        }
        surface
    }

    pub fn is_attached(&self) -> bool {
        self.surface
            .as_ref()
            .is_some_and(|surface| surface.is_attached())
    }

    pub fn break_set(&self) -> &PageBreakSet {
        &self.break_set
    }

    /// Pages presented on the surface, including any buffer page
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn surface_height(&self) -> f32 {
        self.surface_height
    }

    pub fn page_gap(&self) -> f32 {
        self.page_gap
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }
}
