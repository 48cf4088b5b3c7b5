//! XMP packet parsing and serialization.
//!
//! Properties are flattened to `Xmp.<prefix>.<Name>` keys, whether they are
//! written as attributes of `rdf:Description` or as child elements. Array
//! items (`rdf:Bag`, `rdf:Seq`, `rdf:Alt`) are joined with `, `.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::render_raw;
use crate::error::CodecError;
use crate::types::{MetadataSnapshot, TagValue, WriteSet};

const PACKET_HEADER: &str = "<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n";
const PACKET_FOOTER: &str = "\n<?xpacket end=\"w\"?>";

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Namespaces shotdate can write, by prefix.
const NAMESPACES: [(&str, &str); 3] = [
    ("exif", "http://ns.adobe.com/exif/1.0/"),
    ("xmp", "http://ns.adobe.com/xap/1.0/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
];

/// Prefixes that carry packet structure rather than properties.
fn is_structural(prefix: &str) -> bool {
    matches!(prefix, "x" | "rdf" | "xml" | "xmlns")
}

/// Split a qualified name into a property key, if it names a property.
fn property_key(qname: &[u8]) -> Option<String> {
    let qname = String::from_utf8_lossy(qname);
    let (prefix, local) = qname.split_once(':')?;
    if is_structural(prefix) {
        return None;
    }
    Some(format!("Xmp.{prefix}.{local}"))
}

/// Parse an XMP packet into a snapshot of its properties.
pub(super) fn parse(data: &[u8]) -> Result<MetadataSnapshot, CodecError> {
    let mut snapshot = MetadataSnapshot::new();
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    // Open property element: key, depth it was opened at, collected texts
    let mut open: Option<(String, usize, Vec<String>)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if open.is_none() {
                    collect_attributes(e, &mut snapshot)?;
                    if let Some(key) = property_key(e.name().as_ref()) {
                        open = Some((key, depth, Vec::new()));
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if open.is_none() {
                    collect_attributes(e, &mut snapshot)?;
                    if let Some(key) = property_key(e.name().as_ref()) {
                        snapshot.insert(key, "");
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some((_, _, texts)) = open.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| CodecError::Xmp(err.to_string()))?;
                    if !text.trim().is_empty() {
                        texts.push(text.trim().to_string());
                    }
                }
            }
            Ok(Event::End(_)) => {
                if matches!(open, Some((_, opened_at, _)) if opened_at == depth) {
                    if let Some((key, _, texts)) = open.take() {
                        snapshot.insert(key, texts.join(", "));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CodecError::Xmp(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(snapshot)
}

/// Record property attributes (e.g. `xmp:CreateDate="..."`) of an element.
fn collect_attributes(e: &BytesStart<'_>, snapshot: &mut MetadataSnapshot) -> Result<(), CodecError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| CodecError::Xmp(err.to_string()))?;
        if let Some(key) = property_key(attr.key.as_ref()) {
            let value = attr
                .unescape_value()
                .map_err(|err| CodecError::Xmp(err.to_string()))?;
            snapshot.insert(key, value.into_owned());
        }
    }
    Ok(())
}

/// Serialize the XMP entries of `set` into a complete packet.
pub(super) fn build(set: &WriteSet) -> Result<Vec<u8>, CodecError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    emit(
        &mut writer,
        Event::Start(BytesStart::new("x:xmpmeta").with_attributes([("xmlns:x", "adobe:ns:meta/")])),
    )?;
    emit(
        &mut writer,
        Event::Start(BytesStart::new("rdf:RDF").with_attributes([("xmlns:rdf", RDF_NS)])),
    )?;

    let mut description = BytesStart::new("rdf:Description");
    description.push_attribute(("rdf:about", ""));
    for (prefix, uri) in NAMESPACES {
        description.push_attribute((format!("xmlns:{prefix}").as_str(), uri));
    }
    emit(&mut writer, Event::Start(description))?;

    for entry in set.iter() {
        let Some(name) = entry.key.strip_prefix("Xmp.") else {
            continue;
        };
        let Some((prefix, _)) = name.split_once('.') else {
            return Err(CodecError::Xmp(format!("malformed key {}", entry.key)));
        };
        if !NAMESPACES.iter().any(|(p, _)| *p == prefix) {
            return Err(CodecError::Xmp(format!("unknown namespace in {}", entry.key)));
        }
        let element = name.replacen('.', ":", 1);

        emit(&mut writer, Event::Start(BytesStart::new(element.as_str())))?;
        match &entry.value {
            TagValue::Strings(items) => {
                emit(&mut writer, Event::Start(BytesStart::new("rdf:Bag")))?;
                for item in items {
                    emit(&mut writer, Event::Start(BytesStart::new("rdf:li")))?;
                    emit(&mut writer, Event::Text(BytesText::new(item)))?;
                    emit(&mut writer, Event::End(BytesEnd::new("rdf:li")))?;
                }
                emit(&mut writer, Event::End(BytesEnd::new("rdf:Bag")))?;
            }
            value @ TagValue::DateTime(_) => {
                let raw = render_raw(&entry.key, value);
                emit(&mut writer, Event::Text(BytesText::new(&raw)))?;
            }
        }
        emit(&mut writer, Event::End(BytesEnd::new(element.as_str())))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("rdf:Description")))?;
    emit(&mut writer, Event::End(BytesEnd::new("rdf:RDF")))?;
    emit(&mut writer, Event::End(BytesEnd::new("x:xmpmeta")))?;

    let mut packet = PACKET_HEADER.as_bytes().to_vec();
    packet.extend_from_slice(&writer.into_inner());
    packet.extend_from_slice(PACKET_FOOTER.as_bytes());
    Ok(packet)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CodecError> {
    writer
        .write_event(event)
        .map_err(|e| CodecError::Xmp(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::keys;
    use chrono::NaiveDate;

    fn sample_set() -> WriteSet {
        let ts = NaiveDate::from_ymd_opt(2019, 8, 15)
            .unwrap()
            .and_hms_opt(7, 34, 4)
            .unwrap();
        let mut set = WriteSet::new();
        for key in keys::DATE_KEYS {
            set.insert(key, TagValue::DateTime(ts));
        }
        set.insert(
            keys::XMP_SUBJECT,
            TagValue::Strings(vec!["Screenshot".into(), "Phone".into()]),
        );
        set
    }

    #[test]
    fn test_build_then_parse_lists_xmp_keys() {
        let packet = build(&sample_set()).unwrap();
        let text = String::from_utf8(packet.clone()).unwrap();
        assert!(text.starts_with("<?xpacket begin="));
        assert!(text.contains("<exif:DateTimeOriginal>2019-08-15T07:34:04</exif:DateTimeOriginal>"));
        assert!(!text.contains("Exif.Image"));

        let snapshot = parse(&packet).unwrap();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.get(keys::XMP_CREATE_DATE), Some("2019-08-15T07:34:04"));
        assert_eq!(snapshot.get(keys::XMP_DATETIME_DIGITIZED), Some("2019-08-15T07:34:04"));
        assert_eq!(snapshot.get(keys::XMP_SUBJECT), Some("Screenshot, Phone"));
    }

    #[test]
    fn test_parse_attribute_properties() {
        let xmp = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmp:CreateDate="2019-09-13T09:00:07Z"
        xmp:CreatorTool="Shotwell"/>
  </rdf:RDF>
</x:xmpmeta>"#;

        let snapshot = parse(xmp).unwrap();
        assert_eq!(snapshot.get("Xmp.xmp.CreateDate"), Some("2019-09-13T09:00:07Z"));
        assert_eq!(snapshot.get("Xmp.xmp.CreatorTool"), Some("Shotwell"));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_parse_nested_arrays() {
        let xmp = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Sunset</rdf:li></rdf:Alt></dc:title>
      <dc:subject><rdf:Bag><rdf:li>a</rdf:li><rdf:li>b</rdf:li></rdf:Bag></dc:subject>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;

        let snapshot = parse(xmp).unwrap();
        assert_eq!(snapshot.get("Xmp.dc.title"), Some("Sunset"));
        assert_eq!(snapshot.get("Xmp.dc.subject"), Some("a, b"));
    }

    #[test]
    fn test_parse_empty_packet() {
        let xmp = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  </rdf:RDF>
</x:xmpmeta>"#;
        assert!(parse(xmp).unwrap().is_empty());
    }

    #[test]
    fn test_build_rejects_unknown_namespace() {
        let mut set = WriteSet::new();
        set.insert("Xmp.foo.Bar", TagValue::Strings(vec!["x".into()]));
        assert!(matches!(build(&set), Err(CodecError::Xmp(_))));
    }
}
