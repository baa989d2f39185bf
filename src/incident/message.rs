//! Incident title and body templates

/// Body posted when an incident is opened
pub fn render_incident_message(group: &str, name: &str, description: &str) -> String {
    format!(
        "Our team is aware of an issue affecting **{group}** component (`{name}`) in **{description}**. \n\
         We are currently investigating the cause of the issue.\n\
         \n\
         The status of the incident will be updated as soon as more information is available."
    )
}

pub fn render_incident_title(group: &str, name: &str) -> String {
    format!("Incident affecting {group} {name}")
}
