use std::collections::BTreeMap;

use dashboard_core::{PageKind, Region};
use dashboard_logging::dash_debug;

use super::render::RenderCommand;

/// Regions each page mounts, in document order.
pub fn page_regions(page: PageKind) -> &'static [Region] {
    match page {
        PageKind::Conversations => &[Region::Status, Region::List, Region::Detail],
        PageKind::Plugins => &[Region::Status, Region::Summary, Region::List, Region::Detail],
    }
}

fn page_title(page: PageKind) -> &'static str {
    match page {
        PageKind::Conversations => "Conversations",
        PageKind::Plugins => "Plugins &amp; Marketplaces",
    }
}

/// A page's mounted regions and their current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    page: PageKind,
    regions: BTreeMap<Region, String>,
}

impl Document {
    /// Empty skeleton with every region of the page mounted.
    pub fn skeleton(page: PageKind) -> Self {
        Self {
            page,
            regions: page_regions(page)
                .iter()
                .map(|region| (*region, String::new()))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn region(&self, region: Region) -> Option<&str> {
        self.regions.get(&region).map(String::as_str)
    }

    /// Replaces a region's content. Targets that are not mounted are skipped.
    /// Returns true when the content changed.
    pub fn apply(&mut self, command: RenderCommand) -> bool {
        if command.page != self.page {
            return false;
        }
        match self.regions.get_mut(&command.region) {
            Some(current) if *current == command.html => false,
            Some(current) => {
                *current = command.html;
                true
            }
            None => {
                dash_debug!(
                    "Skipping render into missing region {} of {}",
                    command.region.as_str(),
                    self.page
                );
                false
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n<body><main data-page=\"{}\">\n",
            page_title(self.page),
            self.page
        );
        for region in page_regions(self.page) {
            let content = self.regions.get(region).map(String::as_str).unwrap_or("");
            html.push_str(&format!(
                "<section id=\"{}\">{}</section>\n",
                region.as_str(),
                content
            ));
        }
        html.push_str("</main></body></html>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(page: PageKind, region: Region, html: &str) -> RenderCommand {
        RenderCommand {
            page,
            region,
            html: html.to_string(),
        }
    }

    #[test]
    fn skeleton_mounts_page_regions() {
        let doc = Document::skeleton(PageKind::Conversations);
        assert_eq!(doc.region(Region::List), Some(""));
        assert_eq!(doc.region(Region::Summary), None);
    }

    #[test]
    fn missing_region_is_a_no_op() {
        let mut doc = Document::skeleton(PageKind::Conversations);
        let before = doc.clone();
        assert!(!doc.apply(command(PageKind::Conversations, Region::Summary, "<p>x</p>")));
        assert!(!doc.apply(command(PageKind::Plugins, Region::List, "<p>x</p>")));
        assert_eq!(doc, before);
    }

    #[test]
    fn apply_reports_changes_only() {
        let mut doc = Document::skeleton(PageKind::Plugins);
        assert!(doc.apply(command(PageKind::Plugins, Region::List, "<p>a</p>")));
        assert!(!doc.apply(command(PageKind::Plugins, Region::List, "<p>a</p>")));
        assert_eq!(doc.region(Region::List), Some("<p>a</p>"));
    }

    #[test]
    fn html_lists_regions_in_order() {
        let mut doc = Document::skeleton(PageKind::Plugins);
        doc.apply(command(PageKind::Plugins, Region::Summary, "S"));
        let html = doc.to_html();
        let status = html.find("id=\"status\"").unwrap();
        let summary = html.find("<section id=\"summary\">S</section>").unwrap();
        let detail = html.find("id=\"detail\"").unwrap();
        assert!(status < summary && summary < detail);
        assert!(html.contains("<title>Plugins &amp; Marketplaces</title>"));
    }
}
