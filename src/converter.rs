//! Tree converter: walks an [`InputDocument`] and builds the `CONTAINERS`
//! element tree.
//!
//! Every container becomes an `ECUC-CONTAINER-VALUE` with a fresh identifier,
//! every typed value becomes a parameter or reference value inside the
//! matching grouping element of its parent. Entries that cannot be converted
//! are skipped and recorded as [`Diagnostic`]s.

use crate::generator::Element;
use crate::model::*;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Prefix of every definition reference unless configured otherwise.
pub const DEFAULT_ROOT_TOKEN: &str = "/Hamada";

/// Schema-specific conversion settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Prepended to the slash-joined key path in every `DEFINITION-REF`.
    pub root_token: String,
    /// Level whose containers are wrapped in `SUB-CONTAINERS`. Level 1 holds
    /// the direct children of the root. `0` disables wrapping.
    pub sub_containers_level: usize,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            root_token: DEFAULT_ROOT_TOKEN.to_string(),
            sub_containers_level: 1,
        }
    }
}

/// Produces the `UUID` attribute of each container.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Random version-4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomUuid;

impl IdSource for RandomUuid {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Result of one conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The `CONTAINERS` root element.
    pub root: Element,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    pub fn container_count(&self) -> usize {
        self.count("ECUC-CONTAINER-VALUE")
    }

    pub fn parameter_count(&self) -> usize {
        self.count("ECUC-NUMERICAL-PARAM-VALUE") + self.count("ECUC-TEXTUAL-PARAM-VALUE")
    }

    pub fn reference_count(&self) -> usize {
        self.count("ECUC-REFERENCE-VALUE")
    }

    fn count(&self, name: &str) -> usize {
        self.root
            .descendants()
            .iter()
            .filter(|e| e.name == name)
            .count()
    }
}

/// Children of one parent element under construction. Grouping elements are
/// created on first use and reused afterwards; all children keep the order in
/// which they first appeared.
#[derive(Default)]
struct ChildGroups {
    children: Vec<Element>,
    groups: IndexMap<GroupKind, usize>,
}

impl ChildGroups {
    fn push_direct(&mut self, el: Element) {
        self.children.push(el);
    }

    fn push_grouped(&mut self, kind: GroupKind, el: Element) {
        let idx = match self.groups.get(&kind) {
            Some(&idx) => idx,
            None => {
                self.children.push(Element::new(kind.element_name()));
                let idx = self.children.len() - 1;
                self.groups.insert(kind, idx);
                idx
            }
        };
        self.children[idx].push(el);
    }

    fn finish_into(self, parent: &mut Element) {
        parent.children.extend(self.children);
    }
}

pub struct Converter<I: IdSource> {
    options: ConverterOptions,
    ids: I,
    diagnostics: Vec<Diagnostic>,
}

impl Converter<RandomUuid> {
    pub fn with_options(options: ConverterOptions) -> Self {
        Self::new(options, RandomUuid)
    }
}

impl<I: IdSource> Converter<I> {
    pub fn new(options: ConverterOptions, ids: I) -> Self {
        Self {
            options,
            ids,
            diagnostics: Vec::new(),
        }
    }

    /// Convert a whole document. The converter can be reused; diagnostics of
    /// earlier runs are not carried over.
    pub fn convert(&mut self, doc: &InputDocument) -> Conversion {
        self.diagnostics.clear();
        let mut root = Element::new("CONTAINERS");
        self.add_entries(&mut root, &doc.entries, "", 1);
        let conversion = Conversion {
            root,
            diagnostics: std::mem::take(&mut self.diagnostics),
        };
        debug!(
            containers = conversion.container_count(),
            parameters = conversion.parameter_count(),
            references = conversion.reference_count(),
            skipped = conversion.diagnostics.len(),
            "conversion finished"
        );
        conversion
    }

    /// Convert the entries of one container. `path` is the parent's key path
    /// (empty at the root), `level` the level of containers created here.
    fn add_entries(
        &mut self,
        parent: &mut Element,
        entries: &IndexMap<String, InputNode>,
        path: &str,
        level: usize,
    ) {
        let mut groups = ChildGroups::default();
        for (key, node) in entries {
            let child_path = format!("{}/{}", path, key);
            match node {
                InputNode::Value(value) => {
                    let el = self.value_element(value, &child_path);
                    groups.push_grouped(value.kind.group(), el);
                }
                InputNode::Container(children) => {
                    let mut container = self.container_element(key, &child_path);
                    self.add_entries(&mut container, children, &child_path, level + 1);
                    if level == self.options.sub_containers_level {
                        groups.push_grouped(GroupKind::SubContainers, container);
                    } else {
                        groups.push_direct(container);
                    }
                }
                InputNode::Malformed(reason) => {
                    let diagnostic = Diagnostic {
                        path: path.to_string(),
                        key: key.clone(),
                        reason: reason.clone(),
                    };
                    warn!("{}", diagnostic);
                    self.diagnostics.push(diagnostic);
                }
            }
        }
        groups.finish_into(parent);
    }

    fn definition_ref(&self, dest: &str, path: &str) -> Element {
        Element::new("DEFINITION-REF")
            .with_attr("DEST", dest)
            .with_text(format!("{}{}", self.options.root_token, path))
    }

    fn container_element(&mut self, key: &str, path: &str) -> Element {
        Element::new("ECUC-CONTAINER-VALUE")
            .with_attr("UUID", self.ids.next_id())
            .with_child(Element::new("SHORT-NAME").with_text(key))
            .with_child(self.definition_ref("ECUC-PARAM-CONF-CONTAINER-DEF", path))
    }

    fn value_element(&self, value: &TypedValue, path: &str) -> Element {
        let el = Element::new(value.kind.element_name())
            .with_child(self.definition_ref(value.kind.definition_dest(), path));
        match value.kind {
            ParamKind::Reference => el.with_child(
                Element::new("VALUE-REF")
                    .with_attr("DEST", "ECUC-CONTAINER-VALUE")
                    .with_text(value.value.as_str()),
            ),
            _ => el.with_child(Element::new("VALUE").with_text(value.value.as_str())),
        }
    }
}

/// Convert with default options and random identifiers.
pub fn convert(doc: &InputDocument) -> Conversion {
    Converter::with_options(ConverterOptions::default()).convert(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_input_str;

    struct SeqIds(usize);

    impl IdSource for SeqIds {
        fn next_id(&mut self) -> String {
            self.0 += 1;
            format!("id-{}", self.0)
        }
    }

    fn counter() -> SeqIds {
        SeqIds(0)
    }

    fn run(json: &str) -> Conversion {
        let doc = parse_input_str(json).unwrap();
        Converter::new(ConverterOptions::default(), counter()).convert(&doc)
    }

    #[test]
    fn groups_are_created_once_in_order_of_first_use() {
        let conv = run(r#"{"A": {
            "p1": {"type": "BOOLEAN", "value": "true"},
            "r1": {"type": "ref", "value": "/X"},
            "p2": {"type": "ENUMERATION", "value": "ON"},
            "r2": {"type": "ref", "value": "/Y"}
        }}"#);
        let a = &conv.root.children[0].children[0];
        let names: Vec<_> = a.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["SHORT-NAME", "DEFINITION-REF", "PARAMETER-VALUES", "REFERENCE-VALUES"]
        );
        assert_eq!(a.child("PARAMETER-VALUES").unwrap().children.len(), 2);
        assert_eq!(a.child("REFERENCE-VALUES").unwrap().children.len(), 2);
    }

    #[test]
    fn identifiers_come_from_the_id_source() {
        let conv = run(r#"{"A": {"B": {}}, "C": {}}"#);
        let ids: Vec<_> = conv
            .root
            .descendants()
            .iter()
            .filter_map(|e| e.attr("UUID").map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["id-1", "id-2", "id-3"]);
    }

    #[test]
    fn random_uuids_are_distinct() {
        let mut ids = RandomUuid;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn root_token_is_configurable() {
        let doc = parse_input_str(r#"{"A": {"x": {"type": "INTEGER", "value": "1"}}}"#).unwrap();
        let options = ConverterOptions {
            root_token: "/Vendor/Ecuc".into(),
            ..Default::default()
        };
        let conv = Converter::new(options, counter()).convert(&doc);
        let refs: Vec<_> = conv
            .root
            .descendants()
            .iter()
            .filter(|e| e.name == "DEFINITION-REF")
            .filter_map(|e| e.text.clone())
            .collect();
        assert_eq!(refs, vec!["/Vendor/Ecuc/A", "/Vendor/Ecuc/A/x"]);
    }

    #[test]
    fn wrapping_level_is_configurable() {
        let doc = parse_input_str(r#"{"A": {"B": {}, "C": {}}}"#).unwrap();
        let options = ConverterOptions {
            sub_containers_level: 2,
            ..Default::default()
        };
        let conv = Converter::new(options, counter()).convert(&doc);
        let a = conv.root.child("ECUC-CONTAINER-VALUE").unwrap();
        let sub = a.child("SUB-CONTAINERS").unwrap();
        assert_eq!(sub.children_named("ECUC-CONTAINER-VALUE").count(), 2);

        let options = ConverterOptions {
            sub_containers_level: 0,
            ..Default::default()
        };
        let conv = Converter::new(options, counter()).convert(&doc);
        assert!(
            conv.root
                .descendants()
                .iter()
                .all(|e| e.name != "SUB-CONTAINERS")
        );
    }

    #[test]
    fn malformed_entries_are_recorded_with_their_path() {
        let conv = run(r#"{"top": 1, "A": {"B": {"bad": {"type": "FLOAT", "value": "1"}}}}"#);
        assert_eq!(conv.diagnostics.len(), 2);
        assert_eq!(conv.diagnostics[0].path, "");
        assert_eq!(conv.diagnostics[0].key, "top");
        assert_eq!(conv.diagnostics[1].path, "/A/B");
        assert_eq!(conv.diagnostics[1].key, "bad");
        assert_eq!(conv.container_count(), 2);
    }

    #[test]
    fn converter_reuse_resets_diagnostics() {
        let doc = parse_input_str(r#"{"A": {"x": []}}"#).unwrap();
        let mut converter = Converter::new(ConverterOptions::default(), counter());
        assert_eq!(converter.convert(&doc).diagnostics.len(), 1);
        assert_eq!(converter.convert(&doc).diagnostics.len(), 1);
    }

    #[test]
    fn summary_counts() {
        let conv = run(r#"{"A": {
            "b": {"type": "BOOLEAN", "value": "false"},
            "e": {"type": "ENUMERATION", "value": "X"},
            "r": {"type": "ref", "value": "/T"},
            "B": {"i": {"type": "INTEGER", "value": "3"}}
        }}"#);
        assert_eq!(conv.container_count(), 2);
        assert_eq!(conv.parameter_count(), 3);
        assert_eq!(conv.reference_count(), 1);
    }
}
