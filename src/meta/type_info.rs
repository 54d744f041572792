// src/meta/type_info.rs
//! Structural type metadata: methods, capabilities, and concrete types
//!
//! Proxies are assembled against this metadata instead of runtime
//! reflection. Names are identities: two capabilities with the same name are
//! the same capability.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A method signature as seen by matchers and the chain cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    declaring_type: Arc<str>,
    name: Arc<str>,
    attributes: Arc<[Arc<str>]>,
}

impl Method {
    pub fn new(declaring_type: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            attributes: Arc::from(Vec::new()),
        }
    }

    /// Attach a free-form marker attribute (e.g. `"transactional"`)
    pub fn with_attribute(self, attribute: impl Into<Arc<str>>) -> Self {
        let mut attributes: Vec<Arc<str>> = self.attributes.iter().cloned().collect();
        attributes.push(attribute.into());
        Self {
            attributes: Arc::from(attributes),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capability or type that declares this method
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn attributes(&self) -> &[Arc<str>] {
        &self.attributes
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a.as_ref() == attribute)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}

/// A named capability (interface) a type can expose
#[derive(Debug)]
pub struct Capability {
    name: Arc<str>,
    methods: Vec<Method>,
    extends: Vec<Arc<Capability>>,
}

impl Capability {
    pub fn builder(name: impl Into<Arc<str>>) -> CapabilityBuilder {
        CapabilityBuilder {
            name: name.into(),
            methods: Vec::new(),
            extends: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods declared directly on this capability
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Directly extended capabilities
    pub fn extends(&self) -> &[Arc<Capability>] {
        &self.extends
    }

    /// Declared plus inherited methods, first declaration wins per name
    pub fn all_methods(&self) -> Vec<Method> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_methods(&mut seen, &mut out);
        out
    }

    fn collect_methods(&self, seen: &mut HashSet<Arc<str>>, out: &mut Vec<Method>) {
        for method in &self.methods {
            if seen.insert(method.name.clone()) {
                out.push(method.clone());
            }
        }
        for parent in &self.extends {
            parent.collect_methods(seen, out);
        }
    }

    /// Whether this capability is, or transitively extends, `name`
    pub fn is_or_extends(&self, name: &str) -> bool {
        self.name() == name || self.extends.iter().any(|c| c.is_or_extends(name))
    }

    pub fn find_method(&self, name: &str) -> Option<Method> {
        self.all_methods().into_iter().find(|m| m.name() == name)
    }
}

/// Builder for [`Capability`]
pub struct CapabilityBuilder {
    name: Arc<str>,
    methods: Vec<Method>,
    extends: Vec<Arc<Capability>>,
}

impl CapabilityBuilder {
    pub fn method(mut self, name: &str) -> Self {
        self.methods.push(Method::new(self.name.clone(), name));
        self
    }

    pub fn method_with_attributes(mut self, name: &str, attributes: &[&str]) -> Self {
        let method = attributes
            .iter()
            .fold(Method::new(self.name.clone(), name), |m, a| m.with_attribute(*a));
        self.methods.push(method);
        self
    }

    pub fn extends(mut self, parent: Arc<Capability>) -> Self {
        self.extends.push(parent);
        self
    }

    pub fn build(self) -> Arc<Capability> {
        Arc::new(Capability {
            name: self.name,
            methods: self.methods,
            extends: self.extends,
        })
    }
}

/// A concrete type: its own methods, capabilities, and optional parent type
#[derive(Debug)]
pub struct TypeInfo {
    name: Arc<str>,
    parent: Option<Arc<TypeInfo>>,
    capabilities: Vec<Arc<Capability>>,
    methods: Vec<Method>,
}

impl TypeInfo {
    pub fn builder(name: impl Into<Arc<str>>) -> TypeInfoBuilder {
        TypeInfoBuilder {
            name: name.into(),
            parent: None,
            capabilities: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<TypeInfo>> {
        self.parent.as_ref()
    }

    /// Capabilities declared directly on this type
    pub fn capabilities(&self) -> &[Arc<Capability>] {
        &self.capabilities
    }

    /// Methods declared directly on this type
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Every capability of this type, including those inherited through
    /// the parent chain and capability extension, in declaration order.
    pub fn all_capabilities(&self) -> Vec<Arc<Capability>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            for capability in &ty.capabilities {
                collect_capability(capability, &mut seen, &mut out);
            }
            current = ty.parent.as_deref();
        }
        out
    }

    /// Own and inherited methods, then capability methods
    pub fn all_methods(&self) -> Vec<Method> {
        let mut seen: HashSet<Arc<str>> = HashSet::new();
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            for method in &ty.methods {
                if seen.insert(method.name.clone()) {
                    out.push(method.clone());
                }
            }
            current = ty.parent.as_deref();
        }
        for capability in self.all_capabilities() {
            for method in capability.methods() {
                if seen.insert(method.name.clone()) {
                    out.push(method.clone());
                }
            }
        }
        out
    }

    pub fn find_method(&self, name: &str) -> Option<Method> {
        self.all_methods().into_iter().find(|m| m.name() == name)
    }

    /// Whether any capability of this type is, or extends, `capability`
    pub fn implements(&self, capability: &str) -> bool {
        self.all_capabilities().iter().any(|c| c.name() == capability)
    }

    /// Whether this type is `type_name` or inherits from it
    pub fn is_subtype_of(&self, type_name: &str) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.name() == type_name {
                return true;
            }
            current = ty.parent.as_deref();
        }
        false
    }

    /// Type check against either a type or a capability name
    pub fn is_assignable_to(&self, name: &str) -> bool {
        self.is_subtype_of(name) || self.implements(name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn collect_capability(
    capability: &Arc<Capability>,
    seen: &mut HashSet<Arc<str>>,
    out: &mut Vec<Arc<Capability>>,
) {
    if !seen.insert(capability.name.clone()) {
        return;
    }
    out.push(Arc::clone(capability));
    for parent in capability.extends() {
        collect_capability(parent, seen, out);
    }
}

/// Builder for [`TypeInfo`]
pub struct TypeInfoBuilder {
    name: Arc<str>,
    parent: Option<Arc<TypeInfo>>,
    capabilities: Vec<Arc<Capability>>,
    methods: Vec<Method>,
}

impl TypeInfoBuilder {
    pub fn extends(mut self, parent: Arc<TypeInfo>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn implements(mut self, capability: Arc<Capability>) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn method(mut self, name: &str) -> Self {
        self.methods.push(Method::new(self.name.clone(), name));
        self
    }

    pub fn method_with_attributes(mut self, name: &str, attributes: &[&str]) -> Self {
        let method = attributes
            .iter()
            .fold(Method::new(self.name.clone(), name), |m, a| m.with_attribute(*a));
        self.methods.push(method);
        self
    }

    pub fn build(self) -> Arc<TypeInfo> {
        Arc::new(TypeInfo {
            name: self.name,
            parent: self.parent,
            capabilities: self.capabilities,
            methods: self.methods,
        })
    }
}
