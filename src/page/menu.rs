use crate::{
    group_nodes,
    host::{Host, Startup},
    macros::{RenderNode, Text},
    node,
};
use log::warn;
use std::fmt;

pub const CONTAINER_ID: &str = "menu";
const ACTIVE_CLASS: &str = "button primary";
const FALLBACK_PAGE: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    /// Relative document path, also what the current page is compared against.
    pub href:  &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalLink {
    pub href:  &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuConfiguration {
    pub pages:          &'static [PageLink],
    pub external_links: &'static [ExternalLink],
}

pub static FAMILY_PORTAL: MenuConfiguration = MenuConfiguration {
    pages:          &[
        PageLink { href: "index.html", label: "Home" },
        PageLink { href: "ganga_niwas_2.html", label: "Ganga Niwas 2" },
        PageLink { href: "wedding_2020.html", label: "Wedding 2020" },
        PageLink { href: "birthdays.html", label: "Birthdays" },
        PageLink { href: "ganpati.html", label: "Ganpati Celebrations" },
        PageLink { href: "holi.html", label: "Holi Celebrations" },
        PageLink { href: "rakhi.html", label: "Rakhi Celebrations" },
        PageLink { href: "gallery.html", label: "Gallery" },
        PageLink { href: "celebrations.html", label: "Celebrations" },
        PageLink { href: "my_photo.html", label: "My Photo" },
    ],
    // Google Photos albums
    external_links: &[
        ExternalLink {
            href:  "https://photos.app.goo.gl/GaWmynkSnZtA9v3u8",
            label: "गोद भराई - रविना",
        },
        ExternalLink {
            href:  "https://photos.app.goo.gl/hmu9sZtVZQ3rfJZG7",
            label: "गोद भराई - रविना (Mobile)",
        },
        ExternalLink {
            href:  "https://photos.app.goo.gl/cnugttombNy5KWr78",
            label: "Rakhi - 2023",
        },
        ExternalLink {
            href:  "https://photos.app.goo.gl/7XWUJBjLZenUkhuW8",
            label: "Rakhi - 2024",
        },
        ExternalLink {
            href:  "https://photos.app.goo.gl/eHBrc4jEpUokfzDq8",
            label: "Ganpati - 2022",
        },
        ExternalLink {
            href:  "https://photos.app.goo.gl/ch6xfenz2RcNRacQ6",
            label: "Ganpati - 2023",
        },
        ExternalLink {
            href:  "https://photos.app.goo.gl/WrufdDrSJ5NJv9Gd7",
            label: "Panund Parsadi - 2023",
        },
    ],
};

/// The file name the menu highlights for `path`: whatever follows the last `/`,
/// or `index.html` for the site root.
pub fn current_page(path: &str) -> &str {
    let page = &path[path.rfind('/').map_or(0, |i| i + 1)..];
    if page.is_empty() || page == "/" {
        FALLBACK_PAGE
    } else {
        page
    }
}

/// Renders the menu into the `menu` container as soon as it exists.
pub fn init(host: &mut dyn Host, menu: &'static MenuConfiguration) -> Startup {
    Startup::run(host, CONTAINER_ID, move |host| render_menu(host, menu))
}

pub fn render_menu(host: &mut dyn Host, menu: &MenuConfiguration) {
    let current = current_page(host.current_path()).to_owned();
    let Some(container) = host.element_by_id(CONTAINER_ID) else {
        warn!("Menu container not found");
        return;
    };
    container.set_inner_html(render(menu, &current));
}

pub fn render(menu: &MenuConfiguration, current: &str) -> String {
    let pages = RenderNode(|f: &mut fmt::Formatter<'_>| {
        for page in menu.pages {
            let class = (page.href == current).then_some(ACTIVE_CLASS);
            write!(
                f,
                "{}",
                node! { li => node! { a, class = class, href = page.href => Text(page.label) } }
            )?;
        }
        Ok(())
    });

    let external = RenderNode(|f: &mut fmt::Formatter<'_>| {
        if menu.external_links.is_empty() {
            return Ok(());
        }
        write!(
            f,
            "{}",
            group_nodes!(
                node! { li, class = "menu-separator" =>
                    node! { hr, style = "border-color: rgba(255,255,255,0.15); margin: 0.5em 0;" }
                },
                node! { li,
                    style = "padding: 0.5em 0; color: rgba(255,255,255,0.5); font-size: 0.8em; text-align: center;"
                    => "External Albums"
                }
            )
        )?;
        for link in menu.external_links {
            write!(
                f,
                "{}",
                node! { li =>
                    node! { a, href = link.href, target = "_blank" =>
                        Text(link.label),
                        " ",
                        node! { span, style = "font-size: 0.8em;" => "↗" },
                    }
                }
            )?;
        }
        Ok(())
    });

    node! { ul, class = "links" => pages, external }.to_string()
}
