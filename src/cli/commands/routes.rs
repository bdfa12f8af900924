use crate::cli::{utils, OutputFormat};
use crate::router::{self, RouteDescriptor, RouteTable, RouteTarget};

pub fn handle(name: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    let routes = select(router::routes(), name)?;

    utils::output(output_format, &routes, |routes| {
        for route in routes {
            println!("{:<10} {:<8} {}", route.path, route.name.as_deref().unwrap_or("-"), describe(route));
        }
    })
}

fn select<'a>(table: &'a RouteTable, name: Option<&str>) -> anyhow::Result<Vec<&'a RouteDescriptor>> {
    match name {
        Some(name) => match table.by_name(name) {
            Some(route) => Ok(vec![route]),
            None => anyhow::bail!("No route named '{}'", name),
        },
        None => Ok(table.iter().collect()),
    }
}

fn describe(route: &RouteDescriptor) -> String {
    match &route.target {
        RouteTarget::Redirect(to) => format!("redirect -> {}", to),
        RouteTarget::View(view) if route.meta.requires_auth => format!("{} view (requires auth)", view.name()),
        RouteTarget::View(view) if route.meta.public => format!("{} view (public)", view.name()),
        RouteTarget::View(view) => format!("{} view", view.name()),
    }
}
