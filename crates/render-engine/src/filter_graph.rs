//! Typed ffmpeg filter graphs.
//!
//! Graphs are built from [`Filter`] nodes grouped into labelled
//! [`FilterChain`]s and only turned into ffmpeg's textual syntax at the
//! process boundary via `Display`.

use std::fmt;

use storyreel_common::timecode::format_secs;

/// One option of a filter, rendered either as `key=value` or bare.
#[derive(Debug, Clone, PartialEq)]
enum FilterArg {
    Positional(String),
    Named(String, String),
}

/// A single filter, e.g. `scale=1080:1920`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    args: Vec<FilterArg>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a bare value (`scale=W:H` style).
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(FilterArg::Positional(value.to_string()));
        self
    }

    /// Append `key=value`.
    pub fn opt(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.push(FilterArg::Named(key.into(), value.to_string()));
        self
    }

    /// Append `key=value` for a time value, formatted without trailing zeros.
    pub fn secs(self, key: impl Into<String>, secs: f64) -> Self {
        self.opt(key, format_secs(secs))
    }

    /// Append `key='expr'`. Quoting keeps `,` inside expressions out of the chain syntax.
    pub fn expr(self, key: impl Into<String>, expr: impl AsRef<str>) -> Self {
        self.opt(key, format!("'{}'", expr.as_ref()))
    }

    /// Wrap a filter already rendered by another builder (`name=...`).
    pub fn from_rendered(rendered: &str) -> Self {
        match rendered.split_once('=') {
            Some((name, rest)) => Self::new(name).arg(rest),
            None => Self::new(rendered),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a named option, if set.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            FilterArg::Named(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { "=" } else { ":" })?;
            match arg {
                FilterArg::Positional(value) => f.write_str(value)?,
                FilterArg::Named(key, value) => write!(f, "{key}={value}")?,
            }
        }
        Ok(())
    }
}

/// A linear run of filters between labelled pads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    inputs: Vec<String>,
    filters: Vec<Filter>,
    outputs: Vec<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input pad such as `0:v` or `v1`.
    pub fn input(mut self, label: impl Into<String>) -> Self {
        self.inputs.push(label.into());
        self
    }

    pub fn output(mut self, label: impl Into<String>) -> Self {
        self.outputs.push(label.into());
        self
    }

    pub fn then(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// First filter with the given name.
    pub fn find(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.inputs {
            write!(f, "[{label}]")?;
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{filter}")?;
        }
        for label in &self.outputs {
            write!(f, "[{label}]")?;
        }
        Ok(())
    }
}

/// A `-filter_complex` graph: chains separated by `;`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: FilterChain) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn push(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    pub fn chains(&self) -> &[FilterChain] {
        &self.chains
    }

    /// All filters of the graph with the given name, in order.
    pub fn filters_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Filter> + 'a {
        self.chains
            .iter()
            .flat_map(|c| c.filters.iter())
            .filter(move |f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.chains.iter().all(FilterChain::is_empty)
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{chain}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rendering() {
        assert_eq!(Filter::new("setsar").arg(1).to_string(), "setsar=1");
        assert_eq!(
            Filter::new("scale").arg(1080).arg(1920).to_string(),
            "scale=1080:1920"
        );
        assert_eq!(
            Filter::new("xfade")
                .opt("transition", "fade")
                .secs("duration", 0.5)
                .secs("offset", 2.5)
                .to_string(),
            "xfade=transition=fade:duration=0.5:offset=2.5"
        );
        assert_eq!(Filter::new("null").to_string(), "null");
    }

    #[test]
    fn test_chain_and_graph_labels() {
        let graph = FilterGraph::new()
            .chain(
                FilterChain::new()
                    .input("0:v")
                    .then(Filter::new("scale").arg(1080).arg(1920))
                    .then(Filter::new("setsar").arg(1))
                    .output("v0"),
            )
            .chain(
                FilterChain::new()
                    .input("0:a")
                    .input("1:a")
                    .then(Filter::new("amix").opt("inputs", 2))
                    .output("aout"),
            );

        assert_eq!(
            graph.to_string(),
            "[0:v]scale=1080:1920,setsar=1[v0];[0:a][1:a]amix=inputs=2[aout]"
        );
        assert_eq!(graph.filters_named("amix").count(), 1);
        assert!(!graph.is_empty());
    }

    #[test]
    fn test_option_lookup() {
        let filter = Filter::new("zoompan").expr("z", "1+0.1*on/90").opt("d", 90);
        assert_eq!(filter.option("d"), Some("90"));
        assert_eq!(filter.option("z"), Some("'1+0.1*on/90'"));
        assert_eq!(filter.option("x"), None);
    }

    #[test]
    fn test_prebuilt_filter_keeps_text() {
        let rendered = "drawtext=text='a=b':fontsize=28:x='w-text_w'";
        let filter = Filter::from_rendered(rendered);
        assert_eq!(filter.name(), "drawtext");
        assert_eq!(filter.to_string(), rendered);
    }
}
