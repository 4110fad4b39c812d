use crate::expr::Expr;
use crate::signature::Signature;

/// `when Instance.EventName(args...) { body }` on a statically named
/// component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub instance_name: String,
    pub event_name: String,
    pub component_type: String,
    pub body: Box<Expr>,
}

impl Event {
    pub fn render_surface(&self) -> String {
        format!(
            "when {}.{}() {{\n{}\n}}",
            self.instance_name,
            self.event_name,
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `when any Type.EventName(args...) { body }`, the generic (component-type
/// rather than component-instance) handler form.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericEvent {
    pub component_type: String,
    pub event_name: String,
    pub body: Box<Expr>,
}

impl GenericEvent {
    pub fn render_surface(&self) -> String {
        format!(
            "when any {}.{}() {{\n{}\n}}",
            self.component_type,
            self.event_name,
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `receiver.Method(args...)` on a named component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: Box<Expr>,
    pub method_name: String,
    pub args: Vec<Expr>,
    pub result_signature: Signature,
}

impl MethodCall {
    pub fn render_surface(&self) -> String {
        let args = self
            .args
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}.{}({})", self.receiver.render_surface(), self.method_name, args)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// A method call dispatched against `any Type`, the generic form of
/// [`MethodCall`]. Carries an explicit `component` value expression (the
/// receiver is computed rather than a statically named instance).
#[derive(Debug, Clone, PartialEq)]
pub struct GenericMethodCall {
    pub component_type: String,
    pub component: Box<Expr>,
    pub method_name: String,
    pub args: Vec<Expr>,
    pub result_signature: Signature,
}

impl GenericMethodCall {
    pub fn render_surface(&self) -> String {
        let args = self
            .args
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "any {}({}).{}({})",
            self.component_type,
            self.component.render_surface(),
            self.method_name,
            args
        )
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// `receiver.Property` read on a named component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGet {
    pub receiver: Box<Expr>,
    pub property_name: String,
    pub result_signature: Signature,
}

impl PropertyGet {
    pub fn render_surface(&self) -> String {
        format!("{}.{}", self.receiver.render_surface(), self.property_name)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// `receiver.Property = value` written on a named component instance. The
/// inner value expression carries its own `mutation.shape="value"` marking
/// on lowering, matching the original's consumability rule for the written
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySet {
    pub instance_name: String,
    pub receiver: Box<Expr>,
    pub property_name: String,
    pub value: Box<Expr>,
}

impl PropertySet {
    pub fn render_surface(&self) -> String {
        format!(
            "{}.{} = {}",
            self.receiver.render_surface(),
            self.property_name,
            self.value.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `any Type(component).Property` read, the generic form of [`PropertyGet`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenericPropertyGet {
    pub component_type: String,
    pub component: Box<Expr>,
    pub property_name: String,
    pub result_signature: Signature,
}

impl GenericPropertyGet {
    pub fn render_surface(&self) -> String {
        format!(
            "any {}({}).{}",
            self.component_type,
            self.component.render_surface(),
            self.property_name
        )
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// `any Type(component).Property = value`, the generic form of
/// [`PropertySet`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenericPropertySet {
    pub component_type: String,
    pub component: Box<Expr>,
    pub property_name: String,
    pub value: Box<Expr>,
}

impl GenericPropertySet {
    pub fn render_surface(&self) -> String {
        format!(
            "any {}({}).{} = {}",
            self.component_type,
            self.component.render_surface(),
            self.property_name,
            self.value.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `every(Type)` — every registered instance of a component type, as a list.
#[derive(Debug, Clone, PartialEq)]
pub struct EveryComponent {
    pub component_type: String,
}

impl EveryComponent {
    pub fn render_surface(&self) -> String {
        format!("every({})", self.component_type)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::List
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_event_renders_any_prefix() {
        let e = GenericEvent {
            component_type: "Button".into(),
            event_name: "Click".into(),
            body: Box::new(Expr::Break(crate::control::Break)),
        };
        assert!(e.render_surface().starts_with("when any Button.Click()"));
    }
}
