//! Browser binding for the Wanmei landing page.
//!
//! On load the module snapshots the document, mounts a [`Site`], and routes
//! DOM events into it: clicks and key presses are delegated from the
//! document, scrolls come from the window, reveal targets are watched by one
//! `IntersectionObserver`, and timers requested by the interaction layer are
//! armed with `setTimeout`. Every resulting command is rendered by
//! [`render::Renderer`].
//!
//! `backToTop()`, `copyToClipboard(text)` and `showNotification(message)`
//! are exported for inline page scripts.

// wasm-bindgen glue expands to extern blocks.
#![allow(unsafe_code)]

mod clipboard;
mod console;
mod input;
mod layout;
mod render;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{Level, debug, error, warn};
use wanmei_ui::dom::selector;
use wanmei_ui::notify;
use wanmei_ui::reveal::{ROOT_MARGIN, THRESHOLD};
use wanmei_ui::timer::TimerToken;
use wanmei_ui::{Site, UiEvent};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, IntersectionObserver, IntersectionObserverInit, Window};

use crate::clipboard::BrowserClipboard;
use crate::render::Renderer;

struct App {
    site: Site,
    renderer: Renderer,
}

type Shared = Rc<RefCell<App>>;

thread_local! {
    static APP: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

/// Run `f` on the mounted page. Calls made before mount, or re-entrantly
/// while a render is in progress, are dropped.
fn with_app(f: impl FnOnce(&mut App)) {
    let Some(app) = APP.with(|slot| slot.borrow().clone()) else {
        warn!("page is not mounted yet");
        return;
    };
    let Ok(mut app) = app.try_borrow_mut() else {
        debug!("page busy, call dropped");
        return;
    };
    f(&mut app);
}

/// Dispatch one event and render the result. `raw` is the DOM event the
/// commands may cancel.
fn deliver(app: &Shared, event: &UiEvent, raw: Option<&Event>) {
    let Ok(mut app) = app.try_borrow_mut() else {
        debug!(?event, "event arrived during render, dropped");
        return;
    };
    if let UiEvent::Timer(token) = event {
        app.renderer.timer_fired(*token);
    }
    let commands = app.site.dispatch(event);
    app.renderer.apply(commands, raw);
}

fn mount(window: &Window, document: &Document) -> Result<(), JsValue> {
    let layout = layout::scan(window, document);
    let env = layout::client_env(window);
    let options = layout::site_options(document);
    debug!(?options, "page options");
    let (site, commands) = Site::mount(layout, &env, options);

    let app: Shared = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
        let weak = weak.clone();
        let on_timer: Rc<dyn Fn(TimerToken)> = Rc::new(move |token| {
            if let Some(app) = weak.upgrade() {
                deliver(&app, &UiEvent::Timer(token), None);
            }
        });
        RefCell::new(App {
            site,
            renderer: Renderer::new(window.clone(), document.clone(), on_timer),
        })
    });
    app.borrow_mut().renderer.apply(commands, None);

    observe_reveal_targets(&app, document)?;
    listen(&app, window, document)?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    debug!("page mounted");
    Ok(())
}

fn observe_reveal_targets(app: &Shared, document: &Document) -> Result<(), JsValue> {
    let sink = Rc::clone(app);
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            deliver(&sink, &input::intersections(&entries), None);
        },
    );
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(THRESHOLD));
    init.set_root_margin(ROOT_MARGIN);
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();

    for card in layout::query_all(document, selector::REVEAL_TARGETS) {
        observer.observe(&card);
    }
    app.borrow_mut().renderer.set_observer(observer);
    Ok(())
}

/// Listeners live as long as the page; their closures are leaked.
fn listen(app: &Shared, window: &Window, document: &Document) -> Result<(), JsValue> {
    let (sink, win, doc) = (Rc::clone(app), window.clone(), document.clone());
    let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let scroll_y = win.scroll_y().unwrap_or_default();
        deliver(&sink, &input::click(&doc, &event, scroll_y), Some(&event));
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let (sink, win, doc) = (Rc::clone(app), window.clone(), document.clone());
    let on_scroll = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        deliver(&sink, &UiEvent::Scroll(layout::scroll_snapshot(&win, &doc)), None);
    });
    window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
    on_scroll.forget();

    let sink = Rc::clone(app);
    let on_key = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(key) = input::key_down(&event) {
            deliver(&sink, &key, Some(&event));
        }
    });
    document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();
    Ok(())
}

/// Module entry point: mount now, or once the DOM is parsed.
///
/// # Errors
///
/// Fails outside a browser window or if a listener cannot be attached.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console::init_tracing(Level::WARN);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() != "loading" {
        return mount(&window, &document);
    }
    let (win, doc) = (window.clone(), document.clone());
    let on_ready = Closure::once_into_js(move || {
        if let Err(e) = mount(&win, &doc) {
            error!(error = ?e, "page mount failed");
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    Ok(())
}

/// Smooth scroll to the top of the page.
#[wasm_bindgen(js_name = backToTop)]
pub fn back_to_top() {
    with_app(|app| {
        let commands = app.site.back_to_top();
        app.renderer.apply(commands, None);
    });
}

/// Copy `text` and confirm with a notification. Failures are logged to the
/// console and show nothing.
#[wasm_bindgen(js_name = copyToClipboard)]
pub fn copy_to_clipboard(text: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let text = text.to_owned();
    wasm_bindgen_futures::spawn_local(async move {
        let clipboard = BrowserClipboard::new(window);
        let result = notify::copy_to_clipboard(&clipboard, &text).await;
        with_app(|app| {
            let commands = app.site.copy_finished(&result);
            app.renderer.apply(commands, None);
        });
    });
}

/// Show `message` in the top notification toast for two seconds.
#[wasm_bindgen(js_name = showNotification)]
pub fn show_notification(message: &str) {
    with_app(|app| {
        let commands = app.site.notify(message);
        app.renderer.apply(commands, None);
    });
}
