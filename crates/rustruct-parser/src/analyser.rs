//! Semantic analysis of the parsed tree.
//!
//! The analyser walks the AST, recognises workspace-level keywords, builds
//! the typed [`Workspace`] model, and re-tags string attributes as
//! `Name`/`Description`/`Tags`/`Value` so the language server can emit
//! inlay hints. Missing or unexpected structure always becomes a warning;
//! the analyser never fails.

use parking_lot::Mutex;
use rustruct_core::{
    Configuration, Diagnostic, Documentation, Element, ElementKind, ElementRef, IdentifierMode,
    Location, Model, Role, Scope, TokenKind, Views, Visibility, Workspace,
};

use crate::ast::{Node, NodeType};

/// The semantic analyser.
///
/// Holds no state between calls; the mutex merely serialises concurrent
/// invocations should the host ever dispatch requests from more than one
/// thread.
pub struct SemanticAnalyser {
    guard: Mutex<()>,
}

impl SemanticAnalyser {
    /// Create a new analyser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            guard: Mutex::new(()),
        }
    }

    /// Walk the tree, re-tagging attribute tokens in place, and build the
    /// workspace model. Running this twice over the same tree produces the
    /// same model and the same diagnostics.
    pub fn analyse(&self, root: &mut Node) -> (Option<Workspace>, Vec<Diagnostic>) {
        let _guard = self.guard.lock();
        let mut walker = Walker::default();
        let workspace = walker.walk_root(root);
        (workspace, walker.diagnostics)
    }
}

impl Default for SemanticAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Walker {
    diagnostics: Vec<Diagnostic>,
}

impl Walker {
    fn warn(&mut self, message: impl Into<String>, location: Location) {
        self.diagnostics.push(Diagnostic::warning(message, location));
    }

    fn walk_root(&mut self, root: &mut Node) -> Option<Workspace> {
        if root.children.is_empty() {
            self.warn("File must contain a workspace", root.token.location.clone());
            return None;
        }
        let mut workspace = None;
        for child in &mut root.children {
            if child.node_type == NodeType::Keyword && child.content() == "workspace" {
                workspace = Some(self.visit_workspace(child));
            }
        }
        workspace
    }

    fn visit_workspace(&mut self, node: &mut Node) -> Workspace {
        let mut ws = Workspace::default();
        retag_element_attributes(node);
        for attribute in &node.attributes {
            match attribute.kind {
                TokenKind::Name => ws.name = attribute.content.clone(),
                TokenKind::Description => ws.description = attribute.content.clone(),
                _ => {}
            }
        }

        let location = node.token.location.clone();
        for child in &mut node.children {
            match child.node_type {
                NodeType::BraceOpen | NodeType::BraceClose => continue,
                NodeType::Keyword => {}
                _ => {
                    self.warn(
                        format!("Unexpected children: {}", child.content()),
                        child.token.location.clone(),
                    );
                    continue;
                }
            }
            match child.content() {
                "name" => {
                    if let Some(value) = first_string_attribute(child) {
                        ws.name = value;
                    }
                }
                "description" => {
                    if let Some(value) = first_string_attribute(child) {
                        ws.description = value;
                    }
                }
                "!identifiers" => {
                    if let Some(value) = self.expect_option(child, &IdentifierMode::VALUES) {
                        ws.identifiers = IdentifierMode::parse(&value);
                    }
                }
                "properties" => self.visit_properties(child, &mut ws.properties),
                "!docs" => ws.docs = documentation_of(child),
                "!adrs" => ws.adrs = documentation_of(child),
                "configuration" => ws.configuration = Some(self.visit_configuration(child)),
                "model" => ws.model = Some(self.visit_model(child)),
                "views" => ws.views = Some(self.visit_views(child)),
                other => {
                    let message = format!("Unexpected children: {other}");
                    self.warn(message, child.token.location.clone());
                }
            }
        }

        if ws.model.is_none() {
            self.warn("Workspace must contain a model", location.clone());
        }
        if ws.views.is_none() {
            self.warn("Workspace must contain views", location);
        }
        ws
    }

    /// Check a node's first attribute against a closed set of keyword
    /// values. Anything else warns and yields nothing.
    fn expect_option(&mut self, node: &Node, allowed: &[&str]) -> Option<String> {
        if let Some(attribute) = node.attributes.first() {
            if attribute.kind == TokenKind::Keyword
                && allowed.contains(&attribute.content.as_str())
            {
                return Some(attribute.content.clone());
            }
        }
        self.warn(
            format!("Invalid option, possible values [{}]", allowed.join(" ")),
            node.token.location.clone(),
        );
        None
    }

    /// Each string-led child of a `properties` block is one entry: its seed
    /// token becomes the name, its first string attribute the value.
    fn visit_properties(
        &mut self,
        node: &mut Node,
        properties: &mut std::collections::BTreeMap<String, String>,
    ) {
        for child in &mut node.children {
            if child.node_type != NodeType::String {
                continue;
            }
            child.token.kind = TokenKind::Name;
            let mut value = String::new();
            if let Some(attribute) = child
                .attributes
                .iter_mut()
                .find(|a| a.kind.is_string_like())
            {
                attribute.kind = TokenKind::Value;
                value = attribute.content.clone();
            }
            properties.insert(child.token.content.clone(), value);
        }
    }

    fn visit_configuration(&mut self, node: &mut Node) -> Configuration {
        let mut configuration = Configuration::default();
        for child in &mut node.children {
            match child.node_type {
                NodeType::BraceOpen | NodeType::BraceClose => continue,
                NodeType::Keyword => {}
                _ => {
                    self.warn(
                        format!("Unexpected children: {}", child.content()),
                        child.token.location.clone(),
                    );
                    continue;
                }
            }
            match child.content() {
                "scope" => {
                    if let Some(value) = self.expect_option(child, &Scope::VALUES) {
                        configuration.scope = Scope::parse(&value);
                    }
                }
                "visibility" => {
                    if let Some(value) = self.expect_option(child, &Visibility::VALUES) {
                        configuration.visibility = Visibility::parse(&value);
                    }
                }
                "users" => self.visit_users(child, &mut configuration.users),
                "properties" => self.visit_properties(child, &mut configuration.properties),
                other => {
                    let message = format!("Unexpected children: {other}");
                    self.warn(message, child.token.location.clone());
                }
            }
        }
        configuration
    }

    /// Each keyword child of a `users` block maps a user name to a role.
    fn visit_users(
        &mut self,
        node: &Node,
        users: &mut std::collections::BTreeMap<String, Role>,
    ) {
        for child in &node.children {
            if child.node_type != NodeType::Keyword {
                continue;
            }
            if let Some(value) = self.expect_option(child, &Role::VALUES) {
                if let Some(role) = Role::parse(&value) {
                    users.insert(child.token.content.clone(), role);
                }
            }
        }
    }

    fn visit_model(&mut self, node: &mut Node) -> Model {
        let mut model = Model::default();
        for child in &mut node.children {
            match child.node_type {
                NodeType::BraceOpen | NodeType::BraceClose => continue,
                NodeType::Assignment => {
                    self.visit_model_assignment(child, &mut model);
                    continue;
                }
                NodeType::Keyword => {}
                _ => {
                    self.warn(
                        format!("Unexpected children: {}", child.content()),
                        child.token.location.clone(),
                    );
                    continue;
                }
            }
            if let Some(kind) = ElementKind::from_keyword(child.content()) {
                let element = self.visit_element(child, kind);
                model.insert(element);
                continue;
            }
            match child.content() {
                "!identifiers" => {
                    if let Some(value) = self.expect_option(child, &IdentifierMode::VALUES) {
                        model.identifiers = IdentifierMode::parse(&value);
                    }
                }
                other => {
                    // Relationship lines are declarations, not children to
                    // validate.
                    if child.attributes.iter().any(|a| a.kind == TokenKind::Relation) {
                        continue;
                    }
                    let message = format!("Unexpected children: {other}");
                    self.warn(message, child.token.location.clone());
                }
            }
        }
        model
    }

    /// `a = person "User"` registers the element and binds `a` to it.
    fn visit_model_assignment(&mut self, node: &mut Node, model: &mut Model) {
        let Some((identifier, rest)) = node.children.split_first_mut() else {
            return;
        };
        let identifier = identifier.token.content.clone();
        for child in rest {
            let Some(kind) = ElementKind::from_keyword(child.content()) else {
                continue;
            };
            let element = self.visit_element(child, kind);
            model.references.insert(
                identifier.clone(),
                ElementRef {
                    kind,
                    name: element.name.clone(),
                },
            );
            model.insert(element);
        }
    }

    fn visit_element(&mut self, node: &mut Node, kind: ElementKind) -> Element {
        retag_element_attributes(node);
        let mut element = Element::new(kind);
        for attribute in &node.attributes {
            match attribute.kind {
                TokenKind::Name => element.name = attribute.content.clone(),
                TokenKind::Description => element.description = attribute.content.clone(),
                TokenKind::Tags => element.tags = attribute.content.clone(),
                _ => {}
            }
        }
        element
    }

    fn visit_views(&mut self, node: &mut Node) -> Views {
        let mut views = Views::default();
        for child in &mut node.children {
            if child.node_type == NodeType::Keyword && child.content() == "properties" {
                self.visit_properties(child, &mut views.properties);
            }
        }
        views
    }
}

/// Re-tag the first three string-kind attributes of an element-like node as
/// name, description and tags. Already-retagged kinds stay in the string
/// bucket so a second pass assigns the same roles.
fn retag_element_attributes(node: &mut Node) {
    const ROLES: [TokenKind; 3] = [TokenKind::Name, TokenKind::Description, TokenKind::Tags];
    let mut roles = ROLES.iter();
    for attribute in &mut node.attributes {
        if !attribute.kind.is_string_like() {
            continue;
        }
        match roles.next() {
            Some(&role) => attribute.kind = role,
            None => break,
        }
    }
}

fn first_string_attribute(node: &Node) -> Option<String> {
    node.attributes
        .iter()
        .find(|a| a.kind.is_string_like())
        .map(|a| a.content.clone())
}

/// `!docs <path> [fqcn]` and `!adrs <path> [fqcn]` take their parameters as
/// plain keywords.
fn documentation_of(node: &Node) -> Option<Documentation> {
    let mut keywords = node
        .attributes
        .iter()
        .filter(|a| a.kind == TokenKind::Keyword);
    let path = keywords.next()?.content.clone();
    Some(Documentation {
        path,
        fqcn: keywords.next().map(|a| a.content.clone()),
    })
}
