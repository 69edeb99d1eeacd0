//! WASM bindings for live and offline pagination

mod dom;

pub use dom::{DomBlock, DomContainer, DomRenderer, DomSurface};

use crate::live::{PaginationController, PassOutcome, Trigger};
use crate::preview::Paginator;
use crate::render::PageBreakRenderer;
use crate::{BlockId, PaginationConfig, PaginationError};
use dom::{block_elements, js_error};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, MutationObserver, MutationObserverInit, ResizeObserver};

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: PaginationError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn load_config(config_json: Option<String>) -> Result<PaginationConfig, JsValue> {
    match config_json {
        Some(json) => PaginationConfig::from_json(&json).map_err(to_js),
        None => Ok(PaginationConfig::default()),
    }
}

fn to_js_value<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|err| to_js(err.into()))?;
    js_sys::JSON::parse(&json)
}

/// Split static HTML into page chunks (`[{ pageNumber, html }]`)
#[wasm_bindgen(js_name = paginateHtml)]
pub fn paginate_html(html: &str, config_json: Option<String>) -> Result<JsValue, JsValue> {
    let config = load_config(config_json)?;
    let paginator = Paginator::new(DomRenderer, config.dimensions, config.typography);
    let chunks = paginator.paginate(html).map_err(to_js)?;
    to_js_value(&chunks)
}

/// Page geometry for print and export callers
#[wasm_bindgen(js_name = pageDimensions)]
pub fn page_dimensions(config_json: Option<String>) -> Result<JsValue, JsValue> {
    let config = load_config(config_json)?;
    to_js_value(&config.dimensions)
}

/// DOM observers feeding the controller.
///
/// The root's height is pinned by each pass, so its own box stops following
/// the content. Size changes that are not mutations (images, web fonts) are
/// caught by observing every top-level block.
struct Observers {
    root: HtmlElement,
    mutation: MutationObserver,
    resize: ResizeObserver,
    observed: RefCell<Vec<Element>>,
    _on_mutation: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    _on_resize: Closure<dyn FnMut(js_sys::Array, ResizeObserver)>,
}

impl Observers {
    fn attach(root: &HtmlElement, shared: &Rc<Shared>) -> Result<Self, JsValue> {
        let weak = Rc::downgrade(shared);
        let on_mutation = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_records, _observer| {
                if let Some(shared) = weak.upgrade() {
                    shared.trigger(Trigger::Mutation);
                    shared.observe_blocks();
                }
            },
        );
        let mutation = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        options.set_character_data(true);
        mutation.observe_with_options(root, &options)?;

        let weak = Rc::downgrade(shared);
        let on_resize = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |_entries, _observer| {
                if let Some(shared) = weak.upgrade() {
                    shared.trigger(Trigger::Resize);
                }
            },
        );
        let resize = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
        resize.observe(root);

        let observers = Self {
            root: root.clone(),
            mutation,
            resize,
            observed: RefCell::new(Vec::new()),
            _on_mutation: on_mutation,
            _on_resize: on_resize,
        };
        observers.observe_blocks();
        Ok(observers)
    }

    /// Track the current top-level blocks with the resize observer
    fn observe_blocks(&self) {
        let current = block_elements(&self.root);
        let mut observed = self.observed.borrow_mut();
        for element in observed.iter().filter(|element| !current.contains(element)) {
            self.resize.unobserve(element);
        }
        for element in current.iter().filter(|element| !observed.contains(element)) {
            self.resize.observe(element);
        }
        *observed = current;
    }

    fn disconnect(&self) {
        self.mutation.disconnect();
        self.resize.disconnect();
    }
}

/// State shared between the exported handle and DOM callbacks
struct Shared {
    controller: RefCell<PaginationController<DomSurface>>,
    debounce_ms: f64,
    timer: Cell<Option<i32>>,
    on_timer: RefCell<Option<Closure<dyn FnMut()>>>,
    observers: RefCell<Option<Observers>>,
    listeners: RefCell<Vec<js_sys::Function>>,
}

impl Shared {
    fn trigger(&self, trigger: Trigger) {
        // A busy controller means a pass is in flight; drop the trigger
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return;
        };
        let scheduled = controller.notify(trigger, js_sys::Date::now());
        drop(controller);

        if scheduled {
            self.arm_timer(self.debounce_ms);
        }
    }

    fn observe_blocks(&self) {
        if let Some(observers) = self.observers.borrow().as_ref() {
            observers.observe_blocks();
        }
    }

    fn arm_timer(&self, delay_ms: f64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(handle) = self.timer.take() {
            window.clear_timeout_with_handle(handle);
        }

        let on_timer = self.on_timer.borrow();
        let Some(callback) = on_timer.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms.ceil() as i32,
        ) {
            Ok(handle) => self.timer.set(Some(handle)),
            Err(err) => warn!(error = %js_error(&err), "failed to arm pagination timer"),
        }
    }

    fn fire_timer(&self) {
        self.timer.set(None);
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return;
        };
        let now = js_sys::Date::now();
        let outcome = controller.poll(now);
        let remaining = controller.next_deadline().map(|due_at| (due_at - now).max(0.0));
        drop(controller);

        if outcome == Some(PassOutcome::Published) {
            self.notify_listeners();
        }
        // Timer fired before the clock reached the deadline
        if let Some(delay_ms) = remaining {
            self.arm_timer(delay_ms);
        }
    }

    fn run_now(&self) {
        let outcome = self.controller.borrow_mut().recalculate();
        if outcome == PassOutcome::Published {
            self.notify_listeners();
        }
    }

    fn break_ids(&self) -> js_sys::Array {
        self.controller
            .borrow()
            .break_set()
            .sorted_ids()
            .iter()
            .map(|id| JsValue::from_str(id.as_str()))
            .collect()
    }

    fn notify_listeners(&self) {
        let ids = self.break_ids();
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            if let Err(err) = listener.call1(&JsValue::NULL, &ids) {
                warn!(error = %js_error(&err), "page break listener failed");
            }
        }
    }

    fn dispose(&self) {
        if let Some(observers) = self.observers.borrow_mut().take() {
            observers.disconnect();
        }
        if let (Some(handle), Some(window)) = (self.timer.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.detach();
        }
        self.listeners.borrow_mut().clear();
        self.on_timer.borrow_mut().take();
    }
}

/// Live pagination of an editor root element
#[wasm_bindgen]
pub struct LivePaginator {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl LivePaginator {
    /// Observe `root` and paginate its top-level children
    #[wasm_bindgen(constructor)]
    pub fn new(root: HtmlElement, config_json: Option<String>) -> Result<LivePaginator, JsValue> {
        let config = load_config(config_json)?;
        let controller = PaginationController::new(DomSurface::new(root.clone()), &config);

        let shared = Rc::new(Shared {
            controller: RefCell::new(controller),
            debounce_ms: config.debounce_ms,
            timer: Cell::new(None),
            on_timer: RefCell::new(None),
            observers: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let on_timer = Closure::<dyn FnMut()>::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.fire_timer();
            }
        });
        *shared.on_timer.borrow_mut() = Some(on_timer);

        let observers = Observers::attach(&root, &shared)?;
        *shared.observers.borrow_mut() = Some(observers);
        shared.run_now();

        Ok(LivePaginator { shared })
    }

    /// Pages presented on the surface, including any buffer page
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.shared.controller.borrow().page_count()
    }

    #[wasm_bindgen(js_name = surfaceHeight)]
    pub fn surface_height(&self) -> f32 {
        self.shared.controller.borrow().surface_height()
    }

    /// Ids of blocks that open a new page
    #[wasm_bindgen(js_name = breakIds)]
    pub fn break_ids(&self) -> js_sys::Array {
        self.shared.break_ids()
    }

    /// Call `callback(ids)` whenever the break set changes
    #[wasm_bindgen(js_name = onBreaksChanged)]
    pub fn on_breaks_changed(&self, callback: js_sys::Function) {
        self.shared.listeners.borrow_mut().push(callback);
    }

    /// Page-break decorations (`[{ before, pageNumber }]`) for block ids in document order
    pub fn decorations(&self, block_ids: js_sys::Array) -> Result<JsValue, JsValue> {
        let ids: Vec<BlockId> = block_ids
            .iter()
            .filter_map(|value| value.as_string())
            .map(BlockId)
            .collect();
        let controller = self.shared.controller.borrow();
        let renderer = PageBreakRenderer::new(controller.break_set(), controller.page_gap());
        to_js_value(&renderer.decorations(&ids))
    }

    /// Stop observing and release the surface
    pub fn dispose(&self) {
        self.shared.dispose();
    }
}

impl Drop for LivePaginator {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::ControllerState;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount() -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let root: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
        root.set_inner_html("<p>a</p><p>b</p>");
        document.body().unwrap().append_child(&root).unwrap();
        root
    }

    #[wasm_bindgen_test]
    fn test_trigger_ignored_while_controller_busy() {
        let root = mount();
        let paginator = LivePaginator::new(root.clone(), None).unwrap();
        let shared = &paginator.shared;
        // Observer callbacks from attach may already have armed a timer
        if let (Some(handle), Some(window)) = (shared.timer.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
        shared.controller.borrow_mut().recalculate();

        {
            let _busy = shared.controller.borrow_mut();
            shared.trigger(Trigger::Mutation);
        }
        assert_eq!(shared.controller.borrow().state(), ControllerState::Idle);
        assert!(shared.timer.get().is_none());

        shared.trigger(Trigger::Mutation);
        assert!(matches!(
            shared.controller.borrow().state(),
            ControllerState::Scheduled { .. }
        ));
        assert!(shared.timer.get().is_some());

        paginator.dispose();
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_new_blocks_are_resize_observed() {
        let root = mount();
        let paginator = LivePaginator::new(root.clone(), None).unwrap();
        let observed = || {
            paginator
                .shared
                .observers
                .borrow()
                .as_ref()
                .map(|observers| observers.observed.borrow().len())
        };
        assert_eq!(observed(), Some(2));

        let document = web_sys::window().unwrap().document().unwrap();
        let block = document.create_element("p").unwrap();
        root.append_child(&block).unwrap();
        paginator.shared.observe_blocks();
        assert_eq!(observed(), Some(3));

        block.remove();
        paginator.shared.observe_blocks();
        assert_eq!(observed(), Some(2));

        paginator.dispose();
        root.remove();
    }
}
