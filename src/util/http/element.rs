use regex::Regex;
use scraper::ElementRef;

/// Checks whether an element's attribute value matches a loose locator pattern.
///
/// Locators are regexes over attribute values rather than exact CSS selectors
/// so that drifting utility-class names on the source page keep matching.
///
/// # Arguments
///
/// * `element` - The element whose attribute is inspected.
/// * `attr` - The attribute name, e.g. `"class"` or `"id"`.
/// * `pattern` - The locator pattern to match the attribute value against.
///
/// # Returns
///
/// * `bool`: `true` when the attribute exists and the pattern matches it.
pub fn attr_matches(element: &ElementRef, attr: &str, pattern: &Regex) -> bool {
    element
        .value()
        .attr(attr)
        .map(|value| pattern.is_match(value))
        .unwrap_or(false)
}

/// Finds the first descendant with the given tag whose attribute matches a
/// locator pattern. The scope element itself is never considered.
///
/// # Arguments
///
/// * `scope` - The element to search under.
/// * `tag` - The tag name to look for, e.g. `"span"`.
/// * `attr` - The attribute name the locator applies to.
/// * `pattern` - The locator pattern.
///
/// # Returns
///
/// * `Option<ElementRef>`: The first matching descendant in document order.
pub fn find_descendant<'a>(
    scope: ElementRef<'a>,
    tag: &str,
    attr: &str,
    pattern: &Regex,
) -> Option<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == tag && attr_matches(element, attr, pattern))
}

/// Finds the first descendant with the given tag, regardless of attributes.
pub fn find_tag<'a>(scope: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == tag)
}

/// Iterates over every descendant with the given tag, in document order.
pub fn descendant_elements<'a>(
    scope: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |element| element.value().name() == tag)
}

/// Returns the immediate child elements with the given tag.
pub fn child_elements<'a>(scope: ElementRef<'a>, tag: &'static str) -> Vec<ElementRef<'a>> {
    scope
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == tag)
        .collect()
}

/// Returns the first direct text node of an element, trimmed.
///
/// Used for labels whose element carries its own text ahead of decorated
/// child spans. Whitespace-only text counts as absent.
pub fn own_text(element: ElementRef) -> Option<String> {
    element
        .children()
        .find_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
        .filter(|text| !text.is_empty())
}

/// Collects the text of an element and all of its descendants.
pub fn full_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}
