#![warn(clippy::all, rust_2018_idioms)]

/// Device Farm project as far as the settings page cares about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFarmProject {
    pub name: String,
    pub arn: String,
    /// `None` when the project has no VPC configured
    pub vpc: Option<ProjectVpcSettings>,
}

impl DeviceFarmProject {
    pub fn new(name: impl Into<String>, arn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arn: arn.into(),
            vpc: None,
        }
    }

    pub fn with_vpc(mut self, vpc: ProjectVpcSettings) -> Self {
        self.vpc = Some(vpc);
        self
    }
}

/// VPC configuration attached to a Device Farm project
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectVpcSettings {
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

impl ProjectVpcSettings {
    pub fn subnet_ids_text(&self) -> String {
        format_id_list(&self.subnet_ids)
    }

    pub fn security_group_ids_text(&self) -> String {
        format_id_list(&self.security_group_ids)
    }
}

/// Render an id list the way the settings page displays it: `[a, b]`.
pub fn format_id_list(ids: &[String]) -> String {
    format!("[{}]", ids.join(", "))
}
