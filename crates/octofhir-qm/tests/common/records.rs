//! Source record builders

use serde_json::{Value, json};

pub const RECIPIENT: &str = "measure.author@example.com";
pub const USER_ID: &str = "author01";

pub const COHORT_XML: &str = r#"<measure>
  <populations>
    <initialPopulations>
      <clause uuid="ip-1" type="initialPopulation" displayName="Initial Population 1">
        <cqldefinition displayName="Initial Population"/>
      </clause>
    </initialPopulations>
  </populations>
  <measureGrouping>
    <group sequence="1" ucum="mg/dL">
      <packageClause uuid="ip-1" type="initialPopulation" name="Initial Population 1"/>
    </group>
  </measureGrouping>
  <supplementalDataElements>
    <cqldefinition displayName="SDE Sex"/>
  </supplementalDataElements>
</measure>"#;

/// A QDM cohort record, as exported
pub fn qdm_cohort_record() -> Value {
    json!({
        "harpId": USER_ID,
        "emailId": RECIPIENT,
        "manageMeasureDetailModel": {
            "measureName": "CohortMeasure",
            "measureModel": "QDM",
            "cqllibraryName": "CohortMeasure",
            "versionNumber": "1.0",
            "revisionNumber": "3",
            "measScoring": "Cohort",
            "patientBased": true,
            "measFromPeriod": "01/01/2023",
            "measToPeriod": "12/31/2023",
            "eMeasureId": 1179,
            "draft": false
        },
        "simpleXml": COHORT_XML,
        "cql": "library CohortMeasure version '1.0.003'\nusing QDM version '5.6'\n"
    })
}

/// The cohort record with its simple XML replaced
pub fn qdm_record_with_xml(xml: &str) -> Value {
    let mut record = qdm_cohort_record();
    record["simpleXml"] = json!(xml);
    record
}
