//! Model of the active page's editable surface: the elements a one-shot
//! command can target, plus the focus state and a log of fired input
//! events. Elements are held in document order; queries scan front to
//! back.
//!
//! Selection offsets are `char` indices into the owning element's text.

/// Index of an element within its page, in document order.
pub type ElementId = usize;

/// A selection range inside a field or editable region.
///
/// `start == end` is a collapsed caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Value and selection of a native single- or multi-line field.
#[derive(Debug, Clone)]
pub struct TextField {
    pub value: String,
    selection: Span,
}

impl TextField {
    pub fn new(value: &str) -> Self {
        let len = value.chars().count();
        Self {
            value: value.to_string(),
            // Native fields always carry a selection; start at the end.
            selection: Span::caret(len),
        }
    }

    pub fn selection(&self) -> Span {
        self.selection
    }

    /// Clamp to the value length and order the endpoints.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.value.chars().count();
        let a = start.min(len);
        let b = end.min(len);
        self.selection = Span {
            start: a.min(b),
            end: a.max(b),
        };
    }

    /// Replace the whole value; the caret lands at the end.
    pub fn overwrite(&mut self, text: &str) {
        self.value = text.to_string();
        self.selection = Span::caret(text.chars().count());
    }

    /// Splice `text` over the current selection and collapse the caret to
    /// just after the inserted text.
    pub fn splice_selection(&mut self, text: &str) {
        let Span { start, end } = self.selection;
        let start_b = byte_offset(&self.value, start);
        let end_b = byte_offset(&self.value, end);
        self.value.replace_range(start_b..end_b, text);
        self.selection = Span::caret(start + text.chars().count());
    }
}

/// Probe-relevant attributes of an `<input>` element. `None` means the
/// attribute is absent, which is distinct from an empty value.
#[derive(Debug, Clone, Default)]
pub struct InputAttrs {
    pub input_type: Option<String>,
    pub name: Option<String>,
    pub aria_label: Option<String>,
    pub title: Option<String>,
}

impl InputAttrs {
    pub fn of_type(input_type: &str) -> Self {
        Self {
            input_type: Some(input_type.to_string()),
            ..Default::default()
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

/// The closed set of element kinds a command can encounter.
#[derive(Debug, Clone)]
pub enum Element {
    /// `<input>`, a single-line native field.
    Input { attrs: InputAttrs, field: TextField },
    /// `<textarea>`, a multi-line native field.
    TextArea { field: TextField },
    /// A region marked editable-content, holding the page selection span
    /// inside it (absent when the page has no active range).
    Editable {
        text: String,
        selection: Option<Span>,
    },
    /// Focusable but not editable (buttons, links, the body).
    Inert { tag: String },
}

impl Element {
    fn field(&self) -> Option<&TextField> {
        match self {
            Element::Input { field, .. } | Element::TextArea { field } => Some(field),
            _ => None,
        }
    }

    fn field_mut(&mut self) -> Option<&mut TextField> {
        match self {
            Element::Input { field, .. } | Element::TextArea { field } => Some(field),
            _ => None,
        }
    }
}

/// One step of the search-target probe list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    InputType(&'static str),
    InputName(&'static str),
    InputAriaLabel(&'static str),
    InputTitle(&'static str),
    AnyTextArea,
}

impl Probe {
    pub fn matches(&self, element: &Element) -> bool {
        match (self, element) {
            (Probe::InputType(t), Element::Input { attrs, .. }) => {
                attrs.input_type.as_deref() == Some(*t)
            }
            (Probe::InputName(n), Element::Input { attrs, .. }) => {
                attrs.name.as_deref() == Some(*n)
            }
            (Probe::InputAriaLabel(l), Element::Input { attrs, .. }) => {
                attrs.aria_label.as_deref() == Some(*l)
            }
            (Probe::InputTitle(t), Element::Input { attrs, .. }) => {
                attrs.title.as_deref() == Some(*t)
            }
            (Probe::AnyTextArea, Element::TextArea { .. }) => true,
            _ => false,
        }
    }
}

/// Probe order for SEARCH_TEXT when nothing editable is focused.
///
/// Priority is significant: a search-typed input wins over a `q`-named one,
/// which wins over label and title matches, with generic text inputs and
/// textareas as last resorts. First match in document order wins.
pub const SEARCH_PROBES: &[Probe] = &[
    Probe::InputType("search"),
    Probe::InputName("q"),
    Probe::InputAriaLabel("Search"),
    Probe::InputTitle("Search"),
    Probe::InputType("text"),
    Probe::AnyTextArea,
];

/// The live editable surface of one page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    elements: Vec<Element>,
    focus: Option<ElementId>,
    fired: Vec<ElementId>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, attrs: InputAttrs, value: &str) -> ElementId {
        self.push(Element::Input {
            attrs,
            field: TextField::new(value),
        })
    }

    pub fn add_textarea(&mut self, value: &str) -> ElementId {
        self.push(Element::TextArea {
            field: TextField::new(value),
        })
    }

    pub fn add_editable(&mut self, text: &str) -> ElementId {
        self.push(Element::Editable {
            text: text.to_string(),
            selection: None,
        })
    }

    pub fn add_inert(&mut self, tag: &str) -> ElementId {
        self.push(Element::Inert {
            tag: tag.to_string(),
        })
    }

    fn push(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        self.elements.len() - 1
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn focus(&mut self, id: ElementId) {
        if id < self.elements.len() {
            self.focus = Some(id);
        }
    }

    pub fn blur(&mut self) {
        self.focus = None;
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focus
    }

    pub fn focused_element(&self) -> Option<(ElementId, &Element)> {
        let id = self.focus?;
        Some((id, self.elements.get(id)?))
    }

    /// First element matching the probe, in document order.
    pub fn first_match(&self, probe: Probe) -> Option<ElementId> {
        self.elements.iter().position(|e| probe.matches(e))
    }

    /// First editable-content region, in document order.
    pub fn first_editable(&self) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| matches!(e, Element::Editable { .. }))
    }

    // ------------------------------------------------------------------
    // Native field operations
    // ------------------------------------------------------------------

    pub fn field(&self, id: ElementId) -> Option<&TextField> {
        self.elements.get(id).and_then(|e| e.field())
    }

    pub fn set_field_selection(&mut self, id: ElementId, start: usize, end: usize) {
        if let Some(field) = self.elements.get_mut(id).and_then(|e| e.field_mut()) {
            field.set_selection(start, end);
        }
    }

    /// Overwrite a native field's whole value. Returns false when the
    /// element is not a native field.
    pub fn overwrite_field(&mut self, id: ElementId, text: &str) -> bool {
        match self.elements.get_mut(id).and_then(|e| e.field_mut()) {
            Some(field) => {
                field.overwrite(text);
                true
            }
            None => false,
        }
    }

    /// Splice into a native field at its current selection. Returns false
    /// when the element is not a native field.
    pub fn splice_field_selection(&mut self, id: ElementId, text: &str) -> bool {
        match self.elements.get_mut(id).and_then(|e| e.field_mut()) {
            Some(field) => {
                field.splice_selection(text);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Editable-region operations
    // ------------------------------------------------------------------

    pub fn editable_text(&self, id: ElementId) -> Option<&str> {
        match self.elements.get(id)? {
            Element::Editable { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn editable_selection(&self, id: ElementId) -> Option<Span> {
        match self.elements.get(id)? {
            Element::Editable { selection, .. } => *selection,
            _ => None,
        }
    }

    /// Place (or clear) the page selection inside an editable region.
    /// Offsets are clamped to the region's text length.
    pub fn set_editable_selection(&mut self, id: ElementId, span: Option<Span>) {
        if let Some(Element::Editable { text, selection }) = self.elements.get_mut(id) {
            *selection = span.map(|s| {
                let len = text.chars().count();
                let a = s.start.min(len);
                let b = s.end.min(len);
                Span {
                    start: a.min(b),
                    end: a.max(b),
                }
            });
        }
    }

    /// Overwrite an editable region's text content. The previous selection
    /// range does not survive the rewrite.
    pub fn overwrite_editable(&mut self, id: ElementId, new_text: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(Element::Editable { text, selection }) => {
                *text = new_text.to_string();
                *selection = None;
                true
            }
            _ => false,
        }
    }

    /// Insert at the region's active selection range: delete the selected
    /// span, splice the text in, and collapse the selection to just after
    /// it. Returns false when the element is no editable region or no
    /// range is active.
    pub fn insert_at_editable_selection(&mut self, id: ElementId, insert: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(Element::Editable { text, selection }) => {
                let Some(span) = *selection else {
                    return false;
                };
                let start_b = byte_offset(text, span.start);
                let end_b = byte_offset(text, span.end);
                text.replace_range(start_b..end_b, insert);
                *selection = Some(Span::caret(span.start + insert.chars().count()));
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Input events
    // ------------------------------------------------------------------

    /// Record a synthetic input event against an element, so observers of
    /// the page react as they would to typing.
    pub fn fire_input(&mut self, id: ElementId) {
        if id < self.elements.len() {
            self.fired.push(id);
        }
    }

    /// Input events fired so far, in firing order.
    pub fn fired_input_events(&self) -> &[ElementId] {
        &self.fired
    }
}

/// Byte offset of the `char_idx`-th character, or the string's end when the
/// index is past the last character.
fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
