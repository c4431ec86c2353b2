//! An HTML page parsed with `scraper`, acting as the [`Host`] the renderers write
//! into. Elements carrying an `id` are indexed on load; edits are kept aside and
//! applied to the tree by [`Document::into_html`].

use crate::host::{Element, Host, ReadyCallback};
use ahash::AHashMap;
use ego_tree::{NodeId, NodeMut, NodeRef};
use log::debug;
use scraper::{ElementRef, Html, Node as HtmlNode};

/// Script whose position decides which elements exist when the menu is rendered.
const MENU_SCRIPT: &str = "menu.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

#[derive(Debug)]
struct Node {
    node:       NodeId,
    /// Position among all elements, in document order.
    ordinal:    usize,
    class:      String,
    new_class:  Option<String>,
    inner_html: Option<String>,
}

impl Node {
    fn is_edited(&self) -> bool {
        self.inner_html.is_some() || self.new_class.as_ref().is_some_and(|c| *c != self.class)
    }
}

impl Element for Node {
    fn class_name(&self) -> &str {
        self.new_class.as_deref().unwrap_or(&self.class)
    }

    fn set_class_name(&mut self, class: &str) {
        self.new_class = Some(class.to_owned());
    }

    fn set_inner_html(&mut self, html: String) {
        self.inner_html = Some(html);
    }
}

pub struct Document {
    source:    String,
    html:      Html,
    location:  String,
    elements:  AHashMap<String, Node>,
    script_at: usize,
    state:     ReadyState,
    listeners: Vec<ReadyCallback>,
}

fn is_menu_script(src: &str) -> bool {
    let src = src.split(['?', '#']).next().unwrap_or(src);
    src.ends_with(MENU_SCRIPT)
}

impl Document {
    /// Parses `source` and starts out [`ReadyState::Loading`], positioned at the
    /// menu script (or after the last element when the page has none).
    pub fn load(source: String, location: impl Into<String>) -> Self {
        let html = Html::parse_document(&source);
        let mut elements = AHashMap::new();
        let mut script_at = None;
        let mut count = 0;

        let in_order = html.tree.root().descendants().filter_map(ElementRef::wrap);
        for (ordinal, element) in in_order.enumerate() {
            count = ordinal + 1;
            let value = element.value();
            if script_at.is_none()
                && value.name() == "script"
                && value.attr("src").is_some_and(is_menu_script)
            {
                script_at = Some(ordinal);
            }
            // getElementById: the first element in document order wins
            if let Some(id) = value.id() {
                elements.entry(id.to_owned()).or_insert_with(|| Node {
                    node: element.id(),
                    ordinal,
                    class: value.attr("class").unwrap_or_default().to_owned(),
                    new_class: None,
                    inner_html: None,
                });
            }
        }

        Self {
            source,
            html,
            location: location.into(),
            elements,
            script_at: script_at.unwrap_or(count),
            state: ReadyState::Loading,
            listeners: Vec::new(),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.state
    }

    /// Marks the structure as loaded and runs the ready listeners, once.
    pub fn complete(&mut self) {
        if self.state == ReadyState::Complete {
            return;
        }
        self.state = ReadyState::Complete;
        for listener in std::mem::take(&mut self.listeners) {
            let host: &mut dyn Host = &mut *self;
            listener(host);
        }
    }

    /// Serialises the page. Untouched pages come back byte for byte.
    pub fn into_html(mut self) -> String {
        if !self.elements.values().any(Node::is_edited) {
            return self.source;
        }
        for node in self.elements.values() {
            if let Some(class) = node.new_class.as_deref().filter(|c| *c != node.class) {
                set_class(&mut self.html, node.node, class);
            }
            if let Some(html) = &node.inner_html {
                replace_children(&mut self.html, node.node, html);
            }
        }
        self.html.html()
    }
}

fn set_class(html: &mut Html, id: NodeId, class: &str) {
    let Some(mut node) = html.tree.get_mut(id) else {
        return;
    };
    let HtmlNode::Element(element) = node.value() else {
        return;
    };
    if let Some((_, value)) = element.attrs.iter_mut().find(|(name, _)| &*name.local == "class") {
        *value = class.into();
        return;
    }
    // Indexed elements always carry an `id`; borrow its namespace for `class`.
    let Some(mut name) = element.attrs.keys().find(|name| &*name.local == "id").cloned() else {
        return;
    };
    name.local = "class".into();
    element.attrs.insert(name, class.into());
}

fn replace_children(html: &mut Html, id: NodeId, content: &str) {
    let Some(node) = html.tree.get(id) else {
        return;
    };
    let children: Vec<NodeId> = node.children().map(|child| child.id()).collect();
    for child in children {
        if let Some(mut child) = html.tree.get_mut(child) {
            child.detach();
        }
    }

    let fragment = Html::parse_fragment(content);
    if let Some(mut target) = html.tree.get_mut(id) {
        graft(&mut target, *fragment.root_element());
    }
}

/// Deep-copies the children of `source` under `target`.
fn graft(target: &mut NodeMut<'_, HtmlNode>, source: NodeRef<'_, HtmlNode>) {
    for child in source.children() {
        let mut copy = target.append(child.value().clone());
        graft(&mut copy, child);
    }
}

impl Host for Document {
    fn current_path(&self) -> &str {
        &self.location
    }

    fn element_by_id(&mut self, id: &str) -> Option<&mut dyn Element> {
        let parsed_up_to = match self.state {
            ReadyState::Loading => self.script_at,
            ReadyState::Complete => usize::MAX,
        };
        self.elements
            .get_mut(id)
            .filter(|node| node.ordinal < parsed_up_to)
            .map(|node| node as &mut dyn Element)
    }

    fn on_ready(&mut self, callback: ReadyCallback) {
        match self.state {
            ReadyState::Loading => self.listeners.push(callback),
            ReadyState::Complete => {
                debug!("{}: ready listener added after load, it will not run", self.location)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body class="is-preload">
<!-- <div id="menu">commented out</div> -->
<header id="header" class="alt">
    <a href="index.html" class="logo">Old</a>
</header>
<nav id="menu">placeholder</nav>
<script src="assets/js/menu.js"></script>
<div id="late">late</div>
<script>document.write('<div id="fake">x</div>');</script>
</body>
</html>
"#;

    fn inner(doc: &Document, id: &str) -> String {
        let node = doc.html.tree.get(doc.elements[id].node).unwrap();
        ElementRef::wrap(node).unwrap().inner_html()
    }

    fn set(doc: &mut Document, id: &str, html: &str) {
        if let Some(el) = doc.element_by_id(id) {
            el.set_inner_html(html.to_owned());
        }
    }

    #[test]
    fn indexes_elements_by_id() {
        let doc = Document::load(PAGE.to_owned(), "/index.html");
        assert_eq!(inner(&doc, "menu"), "placeholder");
        assert_eq!(inner(&doc, "late"), "late");
        assert_eq!(doc.elements["header"].class, "alt");
        assert!(inner(&doc, "header").contains(r#"<a href="index.html" class="logo">Old</a>"#));
        assert!(!doc.elements.contains_key("fake"));
    }

    #[test]
    fn first_element_with_an_id_wins() {
        let doc = Document::load(
            r#"<div id="x"><span id="x">inner</span></div><p id="x">after</p>"#.to_owned(),
            "/",
        );
        assert_eq!(inner(&doc, "x"), r#"<span id="x">inner</span>"#);
    }

    #[test]
    fn elements_after_menu_script_are_hidden_while_loading() {
        let mut doc = Document::load(PAGE.to_owned(), "/index.html");
        assert_eq!(doc.ready_state(), ReadyState::Loading);
        assert!(doc.element_by_id("menu").is_some());
        assert!(doc.element_by_id("late").is_none());

        doc.complete();
        assert_eq!(doc.ready_state(), ReadyState::Complete);
        assert!(doc.element_by_id("late").is_some());
    }

    #[test]
    fn cache_busted_menu_script_still_counts() {
        for src in ["assets/js/menu.js?v=2", "menu.js#top", "/js/menu.js"] {
            let source = format!(r#"<nav id="menu"></nav><script src="{src}"></script><p id="late"></p>"#);
            let mut doc = Document::load(source, "/");
            assert!(doc.element_by_id("menu").is_some(), "{src}");
            assert!(doc.element_by_id("late").is_none(), "{src}");
        }
        assert!(!is_menu_script("menu.json"));
        assert!(!is_menu_script("main.js?menu.js"));
    }

    #[test]
    fn pages_without_menu_script_are_fully_visible() {
        let mut doc = Document::load(r#"<p>a</p><nav id="menu"></nav>"#.to_owned(), "/");
        assert!(doc.element_by_id("menu").is_some());
    }

    #[test]
    fn ready_listeners_run_once() {
        let mut doc = Document::load(PAGE.to_owned(), "/index.html");
        doc.on_ready(Box::new(|host: &mut dyn Host| {
            if let Some(el) = host.element_by_id("late") {
                el.set_inner_html("done".to_owned());
            }
        }));
        doc.complete();
        doc.complete();
        assert_eq!(doc.elements["late"].inner_html.as_deref(), Some("done"));

        // too late to hear about it
        doc.on_ready(Box::new(|host: &mut dyn Host| {
            if let Some(el) = host.element_by_id("menu") {
                el.set_inner_html("never".to_owned());
            }
        }));
        doc.complete();
        assert!(doc.elements["menu"].inner_html.is_none());
    }

    #[test]
    fn edits_are_applied_to_the_tree() {
        let mut doc = Document::load(PAGE.to_owned(), "/index.html");
        doc.complete();
        set(&mut doc, "menu", r#"<ul class="links"><li><a href="a.html">A</a></li></ul>"#);
        set(&mut doc, "header", "new");
        if let Some(el) = doc.element_by_id("header") {
            el.set_class_name("alt");
        }
        let html = doc.into_html();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(
            r#"<nav id="menu"><ul class="links"><li><a href="a.html">A</a></li></ul></nav>"#
        ));
        assert!(html.contains(r#"<header id="header" class="alt">new</header>"#));
        assert!(html.contains(r#"<!-- <div id="menu">commented out</div> -->"#));
        assert!(html.contains(r#"<body class="is-preload">"#));
        assert!(html.contains(r#"<div id="late">late</div>"#));
    }

    #[test]
    fn untouched_page_is_returned_verbatim() {
        let mut doc = Document::load(PAGE.to_owned(), "/index.html");
        doc.complete();
        if let Some(el) = doc.element_by_id("header") {
            el.set_class_name("alt");
        }
        assert_eq!(doc.into_html(), PAGE);
    }

    #[test]
    fn class_changes_rewrite_or_add_the_attribute() {
        let mut doc = Document::load(
            r#"<div id="a" class=old>1</div><div id="b">2</div>"#.to_owned(),
            "/",
        );
        for id in ["a", "b"] {
            if let Some(el) = doc.element_by_id(id) {
                el.set_class_name("x y");
            }
        }
        let html = doc.into_html();
        assert!(html.contains(r#"<div id="a" class="x y">1</div>"#), "{html}");
        assert!(html.contains(r#"<div id="b" class="x y">2</div>"#), "{html}");
    }

    #[test]
    fn nested_edits_inside_replaced_content_are_dropped() {
        let mut doc = Document::load(
            r#"<div id="outer"><p id="inner">x</p></div>"#.to_owned(),
            "/",
        );
        set(&mut doc, "inner", "inner");
        set(&mut doc, "outer", "outer");
        assert!(doc.into_html().contains(r#"<div id="outer">outer</div>"#));
    }

    #[test]
    fn unclosed_and_stray_markup() {
        let doc = Document::load(
            r#"<ul id="list"><li>1<li>2</ul> a < b <div id="open">tail"#.to_owned(),
            "/",
        );
        assert_eq!(inner(&doc, "list"), "<li>1</li><li>2</li>");
        assert_eq!(inner(&doc, "open"), "tail");
    }
}
