//! Canonical census schema
//!
//! Every cleaned record is normalized into this fixed, ordered field set,
//! whatever headers the submitter used.

use serde::{Deserialize, Serialize};

/// Number of canonical fields
pub const FIELD_COUNT: usize = 12;

/// Canonical census field, declared in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    FirstName,
    LastName,
    Email,
    Phone,
    AddressOne,
    AddressTwo,
    City,
    State,
    ZipCode,
    Organization,
    Local,
    Dob,
}

impl CanonicalField {
    /// All fields in canonical column order
    pub const ALL: [CanonicalField; FIELD_COUNT] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::AddressOne,
        CanonicalField::AddressTwo,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::ZipCode,
        CanonicalField::Organization,
        CanonicalField::Local,
        CanonicalField::Dob,
    ];

    /// Column position in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Output column name
    pub fn column_name(self) -> &'static str {
        match self {
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::Email => "email",
            CanonicalField::Phone => "phone",
            CanonicalField::AddressOne => "address_one",
            CanonicalField::AddressTwo => "address_two",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::ZipCode => "zip_code",
            CanonicalField::Organization => "organization",
            CanonicalField::Local => "local",
            CanonicalField::Dob => "dob",
        }
    }

    /// Look up a field by its output column name
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.column_name() == name.trim())
    }

    /// Known header spellings, already in normalized form
    /// (lower-case ASCII alphanumerics only, see `schema_mapper::normalize_header`)
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::FirstName => &[
                "firstname", "first", "fname", "givenname", "forename", "namefirst",
                "memberfirstname", "employeefirstname",
            ],
            CanonicalField::LastName => &[
                "lastname", "last", "lname", "surname", "familyname", "namelast",
                "memberlastname", "employeelastname",
            ],
            CanonicalField::Email => &[
                "email", "emailaddress", "mail", "eaddress", "personalemail", "workemail",
                "memberemail", "primaryemail",
            ],
            CanonicalField::Phone => &[
                "phone", "phonenumber", "phoneno", "telephone", "tel", "mobile", "mobilephone",
                "cell", "cellphone", "homephone", "contactnumber", "primaryphone",
            ],
            CanonicalField::AddressOne => &[
                "address", "address1", "addressone", "addressline1", "addr1", "street",
                "streetaddress", "mailingaddress", "homeaddress",
            ],
            CanonicalField::AddressTwo => &[
                "address2", "addresstwo", "addressline2", "addr2", "apt", "aptsuite", "suite",
                "unit",
            ],
            CanonicalField::City => &["city", "town", "municipality"],
            CanonicalField::State => &["state", "st", "province", "stateprovince", "region"],
            CanonicalField::ZipCode => &[
                "zip", "zipcode", "postalcode", "postcode", "postal", "zippostalcode",
            ],
            CanonicalField::Organization => &[
                "organization", "organisation", "org", "employer", "company", "union",
                "unionname",
            ],
            CanonicalField::Local => &["local", "localnumber", "localno", "localunion", "chapter"],
            CanonicalField::Dob => &["dob", "dateofbirth", "birthdate", "birthday", "birthdt"],
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Canonical column names in output order
pub fn canonical_headers() -> Vec<String> {
    CanonicalField::ALL
        .iter()
        .map(|field| field.column_name().to_string())
        .collect()
}

/// One census record in canonical shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CanonicalRecord {
    values: [String; FIELD_COUNT],
}

impl CanonicalRecord {
    pub fn get(&self, field: CanonicalField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Values in canonical order
    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }

    /// True when every field is empty
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.is_empty())
    }
}
