// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable element descriptions.
//!
//! An [`Element`] is the declarative description of one node: its
//! [`ElementType`] and its [`Props`] (attributes plus ordered children). A
//! fresh element tree is built for every render and handed to
//! [`Renderer::render`](crate::Renderer::render); the reconciler compares it
//! against the previously committed fibers.
//!
//! Elements are reference counted, so cloning one (or a whole subtree) is
//! cheap and never copies props.
//!
//! # Type identity
//!
//! Two element types are the same iff they are both host elements with equal
//! tags, both text, or both the *same* [`Component`] object. Components are
//! compared by pointer, so a component should be created once and cloned
//! wherever it is used; wrapping the same closure twice yields two distinct
//! types.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::backend::HostNode;
use crate::error::ComponentError;

/// Property name that carries the text of a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Prefix that marks a property as an event listener (`onClick`, `oninput`).
pub const EVENT_PREFIX: &str = "on";

/// An event delivered to a [`Listener`] by a host.
#[derive(Clone, Copy, Debug)]
pub struct Event<'a> {
    /// Event name, e.g. `"click"`.
    pub name: &'a str,
    /// The presentation node the listener was attached to.
    pub target: HostNode,
}

/// A reference-counted event callback.
///
/// Listeners compare by identity: two clones of the same listener are equal,
/// two listeners wrapping identical closures are not.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event<'_>)>);

impl Listener {
    /// Wraps a callback.
    pub fn new(callback: impl Fn(&Event<'_>) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invokes the callback.
    pub fn call(&self, event: &Event<'_>) {
        (self.0)(event);
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// A single property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An event callback; only meaningful under an `on`-prefixed key.
    Listener(Listener),
}

impl PropValue {
    /// Returns the listener, if this value is one.
    #[must_use]
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(listener) => Some(listener),
            _ => None,
        }
    }

    /// Returns the string, if this value is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Listener> for PropValue {
    fn from(value: Listener) -> Self {
        Self::Listener(value)
    }
}

/// Attributes and ordered children of an element.
///
/// `children` is structural and never appears among the attributes.
#[derive(Clone, Default)]
pub struct Props {
    attrs: BTreeMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    /// Creates empty props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds an event listener under `on{event}`, builder style.
    #[must_use]
    pub fn on(mut self, event: &str, callback: impl Fn(&Event<'_>) + 'static) -> Self {
        self.set(
            format!("{EVENT_PREFIX}{event}"),
            PropValue::Listener(Listener::new(callback)),
        );
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.attrs.get(key)
    }

    /// Iterates over attributes in key order.
    pub fn attrs(&self) -> btree_map::Iter<'_, String, PropValue> {
        self.attrs.iter()
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Replaces the children.
    pub fn set_children(&mut self, children: impl IntoIterator<Item = Element>) {
        self.children = children.into_iter().collect();
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("attrs", &self.attrs)
            .field("children", &self.children)
            .finish()
    }
}

/// Result of a component render function.
pub type ComponentResult = Result<Element, ComponentError>;

/// A function that renders props into exactly one element.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Rc<dyn Fn(&Props) -> ComponentResult>,
}

impl Component {
    /// Creates a component from an infallible render function.
    pub fn new(name: &'static str, render: impl Fn(&Props) -> Element + 'static) -> Self {
        Self {
            name,
            render: Rc::new(move |props| Ok(render(props))),
        }
    }

    /// Creates a component whose render function may fail.
    ///
    /// A failure aborts the whole render cycle; see
    /// [`RenderError`](crate::RenderError).
    pub fn fallible(name: &'static str, render: impl Fn(&Props) -> ComponentResult + 'static) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    /// Returns the name given at construction.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Calls the render function.
    pub fn render(&self, props: &Props) -> ComponentResult {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// What kind of node an element describes.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// A typed presentation element, e.g. `div`.
    Host(Rc<str>),
    /// A text node; the text lives in the [`NODE_VALUE`] property.
    Text,
    /// A component rendered through its function.
    Component(Component),
}

/// An immutable node description.
#[derive(Clone)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    /// Creates an element from a type and props.
    #[must_use]
    pub fn new(ty: ElementType, props: Props) -> Self {
        Self {
            ty,
            props: Rc::new(props),
        }
    }

    /// Returns the element type.
    #[must_use]
    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    /// Returns the props.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Returns the shared props handle.
    #[must_use]
    pub fn shared_props(&self) -> &Rc<Props> {
        &self.props
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        self.props.children()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("ty", &self.ty)
            .field("props", &self.props)
            .finish()
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        text(value)
    }
}

/// Builds a host element with the given tag, attributes, and children.
///
/// Strings convert into text elements, so
/// `element("p", Props::new(), ["hello".into()])` describes `<p>hello</p>`.
pub fn element(tag: &str, props: Props, children: impl IntoIterator<Item = Element>) -> Element {
    let mut props = props;
    props.set_children(children);
    Element::new(ElementType::Host(Rc::from(tag)), props)
}

/// Builds a text element.
pub fn text(value: impl Into<String>) -> Element {
    Element::new(
        ElementType::Text,
        Props::new().with(NODE_VALUE, PropValue::Str(value.into())),
    )
}

/// Builds a component element with the given props and children.
///
/// The children are passed to the render function through
/// [`Props::children`]; they are not reconciled unless the component returns
/// them.
pub fn component(
    component: &Component,
    props: Props,
    children: impl IntoIterator<Item = Element>,
) -> Element {
    let mut props = props;
    props.set_children(children);
    Element::new(ElementType::Component(component.clone()), props)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn strings_become_text_children() {
        let el = element("p", Props::new(), ["hello".into()]);
        assert_eq!(el.children().len(), 1);
        let child = &el.children()[0];
        assert_eq!(child.ty(), &ElementType::Text);
        assert_eq!(
            child.props().get(NODE_VALUE),
            Some(&PropValue::Str("hello".into()))
        );
        assert!(child.children().is_empty());
    }

    #[test]
    fn host_types_compare_by_tag() {
        let a = element("div", Props::new(), []);
        let b = element("div", Props::new().with("id", "x"), []);
        let c = element("span", Props::new(), []);
        assert_eq!(a.ty(), b.ty());
        assert_ne!(a.ty(), c.ty());
        assert_ne!(a.ty(), &ElementType::Text);
    }

    #[test]
    fn components_compare_by_identity() {
        let first = Component::new("Item", |_| text("x"));
        let twin = Component::new("Item", |_| text("x"));
        let a = component(&first, Props::new(), []);
        let b = component(&first.clone(), Props::new(), []);
        let c = component(&twin, Props::new(), []);
        assert_eq!(a.ty(), b.ty(), "clones share identity");
        assert_ne!(a.ty(), c.ty(), "separately built components differ");
    }

    #[test]
    fn listeners_compare_by_identity() {
        let l = Listener::new(|_| {});
        let same = PropValue::Listener(l.clone());
        let other = PropValue::Listener(Listener::new(|_| {}));
        assert_eq!(PropValue::Listener(l), same);
        assert_ne!(same, other);
    }

    #[test]
    fn on_builder_uses_event_prefix() {
        let props = Props::new().on("click", |_| {});
        let keys: Vec<_> = props.attrs().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["onclick"]);
        assert!(props.get("onclick").and_then(PropValue::as_listener).is_some());
    }

    #[test]
    fn component_children_travel_in_props() {
        let wrapper = Component::new("Wrapper", |props| {
            element("section", Props::new(), props.children().iter().cloned())
        });
        let el = component(&wrapper, Props::new(), ["a".into(), "b".into()]);
        let ElementType::Component(c) = el.ty() else {
            panic!("expected a component element");
        };
        let rendered = c.render(el.props()).unwrap();
        assert_eq!(rendered.children().len(), 2);
    }
}
