//! Front-end route generation from a menu tree

use shared::models::{MenuNode, RouteRecord};

/// Component assigned to branch nodes that name no view of their own
pub const LAYOUT_COMPONENT: &str = "Layout";

/// Convert a menu tree into route records for the admin SPA
///
/// Paths become absolute by joining parent paths with `/`. Hidden menus still
/// produce routes; the front end decides whether to show them.
pub fn build_routes(tree: &[MenuNode]) -> Vec<RouteRecord> {
    tree.iter().map(|node| build_route(node, "")).collect()
}

fn build_route(node: &MenuNode, parent_path: &str) -> RouteRecord {
    let path = join_path(parent_path, &node.menu.path);
    let children: Vec<RouteRecord> = node
        .children
        .iter()
        .map(|child| build_route(child, &path))
        .collect();

    let component = if node.menu.component.is_empty() && !children.is_empty() {
        LAYOUT_COMPONENT.to_string()
    } else {
        node.menu.component.clone()
    };

    RouteRecord {
        name: node.menu.name.clone(),
        component,
        meta: node.menu.meta.clone(),
        btn_perms: node.menu.btn_perms.clone(),
        path,
        children,
    }
}

/// `join_path("/system", "user")` → `/system/user`; absolute segments win
fn join_path(parent: &str, segment: &str) -> String {
    let segment = segment.trim();
    if segment.starts_with("http://") || segment.starts_with("https://") {
        return segment.to_string();
    }
    if segment.starts_with('/') {
        return segment.to_string();
    }
    let parent = parent.trim_end_matches('/');
    if segment.is_empty() {
        return if parent.is_empty() { "/".into() } else { parent.into() };
    }
    format!("{parent}/{segment}")
}
