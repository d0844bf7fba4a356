//! The typed workspace model built by the semantic analyser.
//!
//! A [`Workspace`] is the document root of the Structurizr DSL. The analyser
//! fills it in while walking the AST; fields stay at their defaults when the
//! corresponding DSL construct is absent or invalid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier scoping mode set by the `!identifiers` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierMode {
    /// All identifiers share one namespace.
    Flat,
    /// Identifiers are scoped to their parent element.
    Hierarchical,
}

impl IdentifierMode {
    /// Accepted DSL spellings, in diagnostic order.
    pub const VALUES: [&'static str; 2] = ["flat", "hierarchical"];

    /// Parse a DSL spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flat" => Some(Self::Flat),
            "hierarchical" => Some(Self::Hierarchical),
            _ => None,
        }
    }

    /// The DSL spelling of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Hierarchical => "hierarchical",
        }
    }
}

impl fmt::Display for IdentifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workspace scope set in the `configuration` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// A system-landscape workspace.
    Landscape,
    /// A single-software-system workspace.
    SoftwareSystem,
    /// Explicitly unscoped.
    None,
}

impl Scope {
    /// Accepted DSL spellings, in diagnostic order.
    pub const VALUES: [&'static str; 3] = ["landscape", "softwaresystem", "none"];

    /// Parse a DSL spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "landscape" => Some(Self::Landscape),
            "softwaresystem" => Some(Self::SoftwareSystem),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Workspace visibility set in the `configuration` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Only listed users can see the workspace.
    Private,
    /// Anyone can see the workspace.
    Public,
}

impl Visibility {
    /// Accepted DSL spellings, in diagnostic order.
    pub const VALUES: [&'static str; 2] = ["private", "public"];

    /// Parse a DSL spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// Per-user access role in the `users` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Read-only access.
    Read,
    /// Read-write access.
    Write,
}

impl Role {
    /// Accepted DSL spellings, in diagnostic order.
    pub const VALUES: [&'static str; 2] = ["read", "write"];

    /// Parse a DSL spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            _ => None,
        }
    }
}

/// A documentation or decision-log attachment (`!docs` / `!adrs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    /// Path to the documentation directory.
    pub path: String,
    /// Fully qualified class name of a custom importer, if given.
    pub fqcn: Option<String>,
}

/// Per-workspace settings from the `configuration` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Workspace scope, unset until declared.
    pub scope: Option<Scope>,
    /// Workspace visibility, unset until declared.
    pub visibility: Option<Visibility>,
    /// User name to role.
    pub users: BTreeMap<String, Role>,
    /// Free-form configuration properties.
    pub properties: BTreeMap<String, String>,
}

/// The kind of an architectural element declared in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A `person` declaration.
    Person,
    /// A `group` declaration.
    Group,
    /// A `softwareSystem` declaration.
    SoftwareSystem,
    /// A `deploymentEnvironment` declaration.
    DeploymentEnvironment,
}

impl ElementKind {
    /// The DSL keyword that declares this kind of element, or `None` when
    /// the keyword is not an element declaration.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "person" => Some(Self::Person),
            "group" => Some(Self::Group),
            "softwareSystem" => Some(Self::SoftwareSystem),
            "deploymentEnvironment" => Some(Self::DeploymentEnvironment),
            _ => None,
        }
    }
}

/// An architectural element declared in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// What kind of element this is.
    pub kind: ElementKind,
    /// Declared name (first string attribute).
    pub name: String,
    /// Declared description (second string attribute).
    pub description: String,
    /// Declared tags (third string attribute).
    pub tags: String,
}

impl Element {
    /// Create an empty element of the given kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            name: String::new(),
            description: String::new(),
            tags: String::new(),
        }
    }
}

/// A lightweight reference from an identifier to a declared element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    /// The kind of the referenced element.
    pub kind: ElementKind,
    /// The referenced element's declared name.
    pub name: String,
}

/// The architectural model: people, systems and their groupings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// `person` declarations keyed by name.
    pub people: BTreeMap<String, Element>,
    /// `group` declarations keyed by name.
    pub groups: BTreeMap<String, Element>,
    /// `softwareSystem` declarations keyed by name.
    pub software_systems: BTreeMap<String, Element>,
    /// `deploymentEnvironment` declarations keyed by name.
    pub deployment_environments: BTreeMap<String, Element>,
    /// Identifier mode declared inside the model.
    pub identifiers: Option<IdentifierMode>,
    /// Identifier to element bindings from `name = element` assignments.
    pub references: BTreeMap<String, ElementRef>,
}

impl Model {
    /// Register an element in the map matching its kind, keyed by its name.
    pub fn insert(&mut self, element: Element) {
        let map = match element.kind {
            ElementKind::Person => &mut self.people,
            ElementKind::Group => &mut self.groups,
            ElementKind::SoftwareSystem => &mut self.software_systems,
            ElementKind::DeploymentEnvironment => &mut self.deployment_environments,
        };
        map.insert(element.name.clone(), element);
    }
}

/// The views block. Only its `properties` are modelled; view definitions
/// themselves are not interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Views {
    /// Free-form view properties.
    pub properties: BTreeMap<String, String>,
}

/// The workspace: document root of a Structurizr DSL file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace name.
    pub name: String,
    /// Workspace description.
    pub description: String,
    /// Identifier mode from the `!identifiers` directive.
    pub identifiers: Option<IdentifierMode>,
    /// Free-form workspace properties.
    pub properties: BTreeMap<String, String>,
    /// Documentation attachment from `!docs`.
    pub docs: Option<Documentation>,
    /// Decision-log attachment from `!adrs`.
    pub adrs: Option<Documentation>,
    /// Per-workspace settings.
    pub configuration: Option<Configuration>,
    /// The architectural model.
    pub model: Option<Model>,
    /// The views block.
    pub views: Option<Views>,
}
