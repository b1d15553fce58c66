//! Plain-text rendering of page and item views for the terminal

use std::fmt;

use crate::constants::labels;
use crate::view::{CategoryView, ItemDetailView, ItemView, PageView, ToggleView};

fn switch(toggle: &ToggleView) -> &'static str {
    match (toggle.checked, toggle.locked) {
        (true, false) => "[on ]",
        (false, false) => "[off]",
        (true, true) => "[on*]",
        (false, true) => "[of*]",
    }
}

fn write_toggle_line(f: &mut fmt::Formatter<'_>, toggle: &ToggleView, text: &str) -> fmt::Result {
    write!(f, "{} {}", switch(toggle), text)?;
    if let Some(tooltip) = toggle.tooltip {
        write!(f, "  ({tooltip})")?;
    }
    writeln!(f)
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.page_toggle {
            Some(toggle) => write_toggle_line(f, toggle, &self.title)?,
            None => writeln!(f, "{}", self.area)?,
        }

        for category in &self.categories {
            writeln!(f)?;
            write!(f, "{category}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CategoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.toggle {
            Some(toggle) => write_toggle_line(f, toggle, &self.title)?,
            None => writeln!(f, "{}", self.title)?,
        }
        if !self.description.is_empty() {
            writeln!(f, "      {}", self.description)?;
        }
        for item in &self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    - {}", self.name)?;
        if self.required {
            write!(f, " [{}]", labels::REQUIRED)?;
        }
        writeln!(f)?;
        writeln!(f, "        {}", self.summary)?;
        if let Some(select) = &self.policy {
            let options: Vec<&str> = select.options.iter().map(|o| o.value).collect();
            writeln!(f, "        policy: {} ({})", select.label, options.join(" | "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ItemDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.required {
            format!("{} [{}]", self.key.item_name, labels::REQUIRED)
        } else {
            self.key.item_name.clone()
        };
        write_toggle_line(f, &self.title, &title)?;
        for channel in [&self.email, &self.in_product] {
            write_toggle_line(f, &channel.toggle, channel.label)?;
            writeln!(f, "      {}", channel.description)?;
        }
        Ok(())
    }
}
