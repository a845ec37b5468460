//! Person ↔ Patient translation.

use carebridge_fhir::{Address, HumanName, Identifier, Meta, Patient};
use carebridge_persistence::model::{Person, PersonAddress, PersonIdentifier, new_uuid};
use chrono::Utc;

use crate::error::{TranslationError, TranslationResult};
use crate::ResourceTranslator;

/// Translates persons to the demographics subset of `Patient`.
///
/// Only the first name and first address are kept; identifiers without a
/// value are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonTranslator;

impl ResourceTranslator<Person, Patient> for PersonTranslator {
    fn to_resource(&self, person: &Person) -> TranslationResult<Patient> {
        if person.id.is_empty() {
            return Err(TranslationError::precondition("person has no identity"));
        }

        let name = HumanName {
            family: person.family_name.clone(),
            given: person.given_name.iter().cloned().collect(),
        };
        Ok(Patient {
            id: Some(person.id.clone()),
            meta: Some(Meta {
                last_updated: Some(person.last_updated),
            }),
            active: Some(!person.voided),
            identifier: person
                .identifiers
                .iter()
                .map(|i| Identifier {
                    system: i.system.clone(),
                    value: Some(i.value.clone()),
                })
                .collect(),
            name: if name == HumanName::default() {
                Vec::new()
            } else {
                vec![name]
            },
            address: person
                .address
                .iter()
                .map(|a| Address {
                    city: a.city.clone(),
                    state: a.state.clone(),
                    postal_code: a.postal_code.clone(),
                    country: a.country.clone(),
                })
                .collect(),
            ..Default::default()
        })
    }

    fn to_record(&self, patient: &Patient) -> TranslationResult<Person> {
        let mut person = Person {
            id: new_uuid(),
            last_updated: Utc::now(),
            ..Default::default()
        };
        self.merge_into(&mut person, patient)?;
        Ok(person)
    }

    fn merge_into(&self, person: &mut Person, patient: &Patient) -> TranslationResult<()> {
        if let Some(id) = patient.id.as_deref().filter(|id| !id.is_empty()) {
            person.id = id.to_string();
        }
        if let Some(name) = patient.name.first() {
            person.given_name = name.given.first().cloned();
            person.family_name = name.family.clone();
        }
        person.identifiers = patient
            .identifier
            .iter()
            .filter_map(|i| {
                Some(PersonIdentifier {
                    system: i.system.clone(),
                    value: i.value.clone()?,
                })
            })
            .collect();
        person.address = patient.address.first().map(|a| PersonAddress {
            city: a.city.clone(),
            state: a.state.clone(),
            postal_code: a.postal_code.clone(),
            country: a.country.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_to_patient() {
        let mut person = Person::new("Jane", "Doe");
        person.identifiers.push(PersonIdentifier {
            system: Some("urn:mrn".to_string()),
            value: "42".to_string(),
        });
        let patient = PersonTranslator.to_resource(&person).unwrap();

        assert_eq!(patient.id.as_deref(), Some(person.id.as_str()));
        assert_eq!(patient.active, Some(true));
        assert_eq!(patient.name[0].given, vec!["Jane"]);
        assert_eq!(patient.name[0].family.as_deref(), Some("Doe"));
        assert_eq!(patient.identifier[0].value.as_deref(), Some("42"));
        assert!(patient.address.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut person = Person::new("Jane", "Doe");
        person.address = Some(PersonAddress {
            city: Some("Kampala".to_string()),
            ..Default::default()
        });
        let patient = PersonTranslator.to_resource(&person).unwrap();

        let mut copy = PersonTranslator.to_record(&patient).unwrap();
        copy.last_updated = person.last_updated;
        assert_eq!(copy, person);
    }

    #[test]
    fn test_voided_person_is_inactive() {
        let mut person = Person::new("A", "B");
        person.voided = true;
        assert_eq!(PersonTranslator.to_resource(&person).unwrap().active, Some(false));
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let err = PersonTranslator.to_resource(&Person::default()).unwrap_err();
        assert!(matches!(err, TranslationError::Precondition { .. }));
    }
}
