use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn on_event(target: &web::EventTarget, event: &str, mut handler: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    handler: impl FnMut() + 'static,
) {
    match document.get_element_by_id(element_id) {
        Some(el) => on_event(&el, "click", handler),
        None => log::warn!("[dom] missing #{element_id}"),
    }
}

/// Every element carrying `attr`, paired with the attribute's value.
pub fn elements_with_attr(document: &web::Document, attr: &str) -> Vec<(web::Element, String)> {
    let Ok(list) = document.query_selector_all(&format!("[{attr}]")) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web::Element>().ok())
        .filter_map(|el| el.get_attribute(attr).map(|v| (el, v)))
        .collect()
}

pub fn input_element(document: &web::Document, id: &str) -> Option<web::HtmlInputElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
}

/// Call `handler` with the parsed value whenever a range/number input moves.
/// Unparsable text is passed as NaN so the engine's fallback applies.
pub fn on_range_input(
    document: &web::Document,
    id: &str,
    mut handler: impl FnMut(f32) + 'static,
) {
    let Some(input) = input_element(document, id) else {
        log::warn!("[dom] missing #{id}");
        return;
    };
    let source = input.clone();
    on_event(&input, "input", move || {
        handler(source.value().trim().parse::<f32>().unwrap_or(f32::NAN));
    });
}

pub fn on_checkbox_change(
    document: &web::Document,
    id: &str,
    mut handler: impl FnMut(bool) + 'static,
) {
    let Some(input) = input_element(document, id) else {
        log::warn!("[dom] missing #{id}");
        return;
    };
    let source = input.clone();
    on_event(&input, "change", move || handler(source.checked()));
}

pub fn set_input_value(document: &web::Document, id: &str, value: f32) {
    if let Some(input) = input_element(document, id) {
        input.set_value(&format!("{value}"));
    }
}

pub fn set_checked(document: &web::Document, id: &str, on: bool) {
    if let Some(input) = input_element(document, id) {
        input.set_checked(on);
    }
}

pub fn toggle_class(document: &web::Document, id: &str, class: &str, on: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.class_list().toggle_with_force(class, on);
    }
}
