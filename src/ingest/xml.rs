// src/ingest/xml.rs
//! RSS 2.0 / RSS 1.0 (RDF) / Atom documents into `RawFeedItem`s.
//!
//! Elements are matched on resolved namespace + local name, so extension
//! elements (`media:title`, `atom:link` inside RSS) never shadow core ones.

use std::borrow::Cow;

use anyhow::{anyhow, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::ingest::types::RawFeedItem;

const RSS1_NS: &[u8] = b"http://purl.org/rss/1.0/";
const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
const ATOM03_NS: &[u8] = b"http://purl.org/atom/ns#";
const DC_NS: &[u8] = b"http://purl.org/dc/elements/1.1/";
const CONTENT_NS: &[u8] = b"http://purl.org/rss/1.0/modules/content/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Rss,
    Atom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    None,
    Rss1,
    Atom,
    Dc,
    Content,
    Other,
}

fn classify_ns(res: &ResolveResult) -> Ns {
    match res {
        ResolveResult::Unbound => Ns::None,
        ResolveResult::Bound(Namespace(uri)) => match *uri {
            RSS1_NS => Ns::Rss1,
            ATOM_NS | ATOM03_NS => Ns::Atom,
            DC_NS => Ns::Dc,
            CONTENT_NS => Ns::Content,
            _ => Ns::Other,
        },
        // undeclared prefix: trust the conventional ones
        ResolveResult::Unknown(prefix) => match prefix.as_slice() {
            b"dc" => Ns::Dc,
            b"content" => Ns::Content,
            _ => Ns::Other,
        },
    }
}

impl Format {
    fn from_root(local: &[u8]) -> Result<Self> {
        match local {
            b"rss" | b"RDF" => Ok(Self::Rss),
            b"feed" => Ok(Self::Atom),
            other => Err(anyhow!(
                "unrecognized feed root <{}>",
                String::from_utf8_lossy(other)
            )),
        }
    }

    fn is_core(self, ns: Ns) -> bool {
        match self {
            Self::Rss => matches!(ns, Ns::None | Ns::Rss1),
            Self::Atom => matches!(ns, Ns::None | Ns::Atom),
        }
    }

    fn entry_tag(self) -> &'static [u8] {
        match self {
            Self::Rss => b"item",
            Self::Atom => b"entry",
        }
    }

    /// Which `RawFeedItem` slot a direct child of an item feeds, if any.
    fn field(self, ns: Ns, local: &[u8]) -> Option<Field> {
        if self.is_core(ns) {
            return match (self, local) {
                (_, b"title") => Some(Field::Title),
                (Self::Rss, b"link") => Some(Field::Link),
                (Self::Rss, b"guid") => Some(Field::Guid),
                (Self::Rss, b"pubDate") => Some(Field::PubDate),
                (Self::Rss, b"description") => Some(Field::Summary),
                (Self::Atom, b"id") => Some(Field::Id),
                (Self::Atom, b"published" | b"issued") => Some(Field::Published),
                (Self::Atom, b"updated" | b"modified") => Some(Field::Updated),
                (Self::Atom, b"summary") => Some(Field::Summary),
                (Self::Atom, b"content") => Some(Field::Content),
                _ => None,
            };
        }
        match (ns, local) {
            (Ns::Dc, b"date") => Some(Field::IsoDate),
            (Ns::Content, b"encoded") if self == Self::Rss => Some(Field::Content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Guid,
    Id,
    IsoDate,
    PubDate,
    Published,
    Updated,
    Summary,
    Content,
}

impl Field {
    fn slot(self, it: &mut RawFeedItem) -> &mut Option<String> {
        match self {
            Self::Title => &mut it.title,
            Self::Link => &mut it.link,
            Self::Guid => &mut it.guid,
            Self::Id => &mut it.id,
            Self::IsoDate => &mut it.iso_date,
            Self::PubDate => &mut it.pub_date,
            Self::Published => &mut it.published,
            Self::Updated => &mut it.updated,
            Self::Summary => &mut it.summary,
            Self::Content => &mut it.content,
        }
    }
}

#[derive(Debug)]
struct AtomLink {
    href: String,
    rel: Option<String>,
}

fn atom_link(e: &BytesStart) -> AtomLink {
    let mut link = AtomLink {
        href: String::new(),
        rel: None,
    };
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        match attr.key.local_name().as_ref() {
            b"href" => link.href = value,
            b"rel" => link.rel = Some(value),
            _ => {}
        }
    }
    link
}

/// `rel="alternate"` (or no rel) first, else whatever link comes first.
fn best_link(links: &[AtomLink]) -> Option<String> {
    let usable = || links.iter().filter(|l| !l.href.trim().is_empty());
    usable()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| usable().next())
        .map(|l| l.href.clone())
}

/// One `<item>`/`<entry>` being read.
#[derive(Debug, Default)]
struct Draft {
    item: RawFeedItem,
    links: Vec<AtomLink>,
    /// Open elements below the item element.
    depth: usize,
    field: Option<Field>,
    buf: String,
}

impl Draft {
    /// First non-blank value wins.
    fn commit(&mut self) {
        let text = std::mem::take(&mut self.buf);
        if let Some(field) = self.field.take() {
            let text = text.trim();
            let slot = field.slot(&mut self.item);
            if slot.is_none() && !text.is_empty() {
                *slot = Some(text.to_string());
            }
        }
    }

    fn finish(mut self, format: Format) -> RawFeedItem {
        if format == Format::Atom {
            self.item.link = best_link(&self.links);
        }
        self.item
    }
}

/// Parse an RSS or Atom document.
pub fn parse_feed(xml: &str) -> Result<Vec<RawFeedItem>> {
    let xml = scrub_html_entities_for_xml(xml);
    let mut reader = NsReader::from_str(&xml);

    let mut format: Option<Format> = None;
    let mut draft: Option<Draft> = None;
    let mut items = Vec::new();

    loop {
        let (res, event) = reader.read_resolved_event().context("parsing feed xml")?;
        match event {
            Event::Start(e) | Event::Empty(e) if format.is_none() => {
                format = Some(Format::from_root(e.local_name().as_ref())?);
            }
            Event::Start(e) => {
                let Some(fmt) = format else { continue };
                let ns = classify_ns(&res);
                let local = e.local_name();
                match draft.as_mut() {
                    None => {
                        if local.as_ref() == fmt.entry_tag() && fmt.is_core(ns) {
                            draft = Some(Draft::default());
                        }
                    }
                    Some(d) => {
                        d.depth += 1;
                        if d.depth == 1 {
                            if fmt == Format::Atom && fmt.is_core(ns) && local.as_ref() == b"link"
                            {
                                d.links.push(atom_link(&e));
                            } else {
                                d.field = fmt.field(ns, local.as_ref());
                            }
                        }
                    }
                }
            }
            Event::Empty(e) => {
                let (Some(fmt), Some(d)) = (format, draft.as_mut()) else {
                    continue;
                };
                if d.depth == 0
                    && fmt == Format::Atom
                    && fmt.is_core(classify_ns(&res))
                    && e.local_name().as_ref() == b"link"
                {
                    d.links.push(atom_link(&e));
                }
            }
            Event::Text(e) => {
                if let Some(d) = draft.as_mut().filter(|d| d.field.is_some()) {
                    let text = e
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned().into());
                    d.buf.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(d) = draft.as_mut().filter(|d| d.field.is_some()) {
                    d.buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(d) = draft.as_mut() else { continue };
                if d.depth == 0 {
                    if let (Some(fmt), Some(done)) = (format, draft.take()) {
                        items.push(done.finish(fmt));
                    }
                } else {
                    if d.depth == 1 {
                        d.commit();
                    }
                    d.depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if format.is_none() {
        return Err(anyhow!("empty feed document"));
    }
    Ok(items)
}

/// HTML entities that feeds leak into XML, which quick-xml would reject.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
