use crate::{group_nodes, host::Host, macros::Text, node, page::menu};
use log::warn;

pub const CONTAINER_ID: &str = "header";

#[derive(Debug, Clone, Copy)]
pub struct Branding {
    pub title:  &'static str,
    /// Subtitle shown next to the title.
    pub author: &'static str,
    pub home:   &'static str,
}

pub static FAMILY_PORTAL: Branding = Branding {
    title:  "Family Portal",
    author: "by Sunil Sharma",
    home:   "index.html",
};

lazy_static::lazy_static! {
    pub static ref HEADER: String = fragment(&FAMILY_PORTAL);
}

pub fn fragment(branding: &Branding) -> String {
    let menu_anchor = format!("#{}", menu::CONTAINER_ID);
    group_nodes!(
        node! { a, href = branding.home, class = "logo" =>
            node! { strong => Text(branding.title) },
            " ",
            node! { span => Text(branding.author) },
        },
        node! { nav => node! { a, href = menu_anchor.as_str() => "Menu" } }
    )
    .to_string()
}

/// Swaps the `header` container's content for `fragment`, keeping whatever
/// class other scripts gave it.
pub fn render_header(host: &mut dyn Host, fragment: &str) {
    let Some(container) = host.element_by_id(CONTAINER_ID) else {
        warn!("Header container not found");
        return;
    };
    let class = container.class_name().to_owned();
    container.set_inner_html(fragment.to_owned());
    container.set_class_name(&class);
}
