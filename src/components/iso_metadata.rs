//! Dates from ISO 19139 metadata documents shipped next to the rasters.
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::{events::Event, Reader};
use std::path::Path;

use crate::errors::{CatalogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoMetadata {
    /// `gml:beginPosition`
    pub start: Option<DateTime<Utc>>,
    /// `gml:endPosition`
    pub end: Option<DateTime<Utc>>,
    /// Date of the `gmd:CI_Date` typed as `creation`.
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Begin,
    End,
    Date,
}

impl IsoMetadata {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let xml = std::fs::read_to_string(&path)?;
        Self::parse(&xml, &path.as_ref().display().to_string())
    }

    pub fn from_str(xml: &str) -> Result<Self> {
        Self::parse(xml, "<memory>")
    }

    fn parse(xml: &str, origin: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut start = None;
        let mut end = None;
        let mut created = None;

        let mut current = None;
        let mut in_ci_date = false;
        let mut date_text: Option<String> = None;
        let mut is_creation = false;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"beginPosition" => current = Some(Field::Begin),
                    b"endPosition" => current = Some(Field::End),
                    b"CI_Date" => {
                        in_ci_date = true;
                        date_text = None;
                        is_creation = false;
                    }
                    b"date" if in_ci_date => current = Some(Field::Date),
                    b"CI_DateTypeCode" if in_ci_date => is_creation |= is_creation_code(e),
                    _ => {}
                },
                Event::Empty(ref e) => {
                    if in_ci_date && e.local_name().as_ref() == b"CI_DateTypeCode" {
                        is_creation |= is_creation_code(e);
                    }
                }
                Event::Text(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    match current {
                        Some(Field::Begin) if start.is_none() => start = Some(text),
                        Some(Field::End) if end.is_none() => end = Some(text),
                        Some(Field::Date) => date_text = Some(text),
                        _ => {}
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"beginPosition" | b"endPosition" | b"date" => current = None,
                    b"CI_Date" => {
                        if is_creation && created.is_none() {
                            created = date_text.take();
                        }
                        in_ci_date = false;
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        let created = created.ok_or_else(|| CatalogError::MissingXmlField {
            path: origin.to_owned(),
            field: "creation date",
        })?;
        Ok(Self {
            start: start.as_deref().map(parse_date).transpose()?,
            end: end.as_deref().map(parse_date).transpose()?,
            created: parse_date(&created)?,
        })
    }
}

fn is_creation_code(element: &quick_xml::events::BytesStart) -> bool {
    element.attributes().flatten().any(|attribute| {
        attribute.key.local_name().as_ref() == b"codeListValue"
            && attribute.value.as_ref() == b"creation"
    })
}

/// Keeps the `YYYY-MM-DD` prefix and reads it as UTC midnight.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| CatalogError::BadDate(text.to_owned()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    pub(crate) const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gmd:MD_Metadata xmlns:gmd="http://www.isotc211.org/2005/gmd"
                 xmlns:gco="http://www.isotc211.org/2005/gco"
                 xmlns:gml="http://www.opengis.net/gml/3.2">
  <gmd:identificationInfo>
    <gmd:citation>
      <gmd:CI_Citation>
        <gmd:date>
          <gmd:CI_Date>
            <gmd:date><gco:Date>2019-03-01</gco:Date></gmd:date>
            <gmd:dateType>
              <gmd:CI_DateTypeCode codeList="x" codeListValue="publication">publication</gmd:CI_DateTypeCode>
            </gmd:dateType>
          </gmd:CI_Date>
        </gmd:date>
        <gmd:date>
          <gmd:CI_Date>
            <gmd:date><gco:DateTime>2020-05-12T13:45:00</gco:DateTime></gmd:date>
            <gmd:dateType>
              <gmd:CI_DateTypeCode codeList="x" codeListValue="creation"/>
            </gmd:dateType>
          </gmd:CI_Date>
        </gmd:date>
      </gmd:CI_Citation>
    </gmd:citation>
    <gmd:extent>
      <gml:TimePeriod gml:id="tp">
        <gml:beginPosition>2011-06-01</gml:beginPosition>
        <gml:endPosition>2013-09-30T00:00:00</gml:endPosition>
      </gml:TimePeriod>
    </gmd:extent>
  </gmd:identificationInfo>
</gmd:MD_Metadata>"#;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[rstest]
    fn reads_period_and_creation() {
        let metadata = IsoMetadata::from_str(DOCUMENT).unwrap();
        assert_eq!(metadata.start, Some(utc(2011, 6, 1)));
        assert_eq!(metadata.end, Some(utc(2013, 9, 30)));
        assert_eq!(metadata.created, utc(2020, 5, 12));
    }

    #[rstest]
    fn creation_date_is_required() {
        let document = DOCUMENT.replace("\"creation\"", "\"revision\"");
        assert!(matches!(
            IsoMetadata::from_str(&document),
            Err(CatalogError::MissingXmlField { field: "creation date", .. })
        ));
    }

    #[rstest]
    #[case("2020-05-12", utc(2020, 5, 12))]
    #[case("2020-05-12T23:59:59.999Z", utc(2020, 5, 12))]
    fn dates_are_truncated_to_the_day(#[case] text: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_date(text).unwrap(), expected);
    }

    #[rstest]
    fn garbage_dates_are_rejected() {
        assert!(matches!(parse_date("12/05/2020"), Err(CatalogError::BadDate(_))));
    }
}
