//! Employee records.

use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::choice::Choice;
use crate::allocator::IdentifiedRecord;
use crate::ident::ExternalId;

/// Table holding employees.
pub const EMPLOYEES: &str = "employees";

/// Recorded gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Choice for Gender {
    const KIND: &'static str = "gender";
    const ALL: &'static [Self] = &[Self::Male, Self::Female];

    fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Job position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Position {
    Manager,
    Developer,
    Designer,
    Tester,
    HrManager,
    Intern,
    SoftwareEngineer,
    DataScientist,
    ProductManager,
    BusinessAnalyst,
    DevopsEngineer,
    SystemAdministrator,
    NetworkEngineer,
    TechnicalSupport,
    ItConsultant,
    Other,
}

impl Choice for Position {
    const KIND: &'static str = "position";
    const ALL: &'static [Self] = &[
        Self::Manager,
        Self::Developer,
        Self::Designer,
        Self::Tester,
        Self::HrManager,
        Self::Intern,
        Self::SoftwareEngineer,
        Self::DataScientist,
        Self::ProductManager,
        Self::BusinessAnalyst,
        Self::DevopsEngineer,
        Self::SystemAdministrator,
        Self::NetworkEngineer,
        Self::TechnicalSupport,
        Self::ItConsultant,
        Self::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Developer => "developer",
            Self::Designer => "designer",
            Self::Tester => "tester",
            Self::HrManager => "hr-manager",
            Self::Intern => "intern",
            Self::SoftwareEngineer => "software-engineer",
            Self::DataScientist => "data-scientist",
            Self::ProductManager => "product-manager",
            Self::BusinessAnalyst => "business-analyst",
            Self::DevopsEngineer => "devops-engineer",
            Self::SystemAdministrator => "system-administrator",
            Self::NetworkEngineer => "network-engineer",
            Self::TechnicalSupport => "technical-support",
            Self::ItConsultant => "it-consultant",
            Self::Other => "other",
        }
    }
}

/// Department an employee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Department {
    Sales,
    ResearchAndDevelopment,
    SoftwareDevelopment,
    ProductResearch,
    Marketing,
    HumanResource,
    Legal,
    CustomerService,
}

impl Choice for Department {
    const KIND: &'static str = "department";
    const ALL: &'static [Self] = &[
        Self::Sales,
        Self::ResearchAndDevelopment,
        Self::SoftwareDevelopment,
        Self::ProductResearch,
        Self::Marketing,
        Self::HumanResource,
        Self::Legal,
        Self::CustomerService,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::ResearchAndDevelopment => "research-and-development",
            Self::SoftwareDevelopment => "software-development",
            Self::ProductResearch => "product-research",
            Self::Marketing => "marketing",
            Self::HumanResource => "human-resource",
            Self::Legal => "legal",
            Self::CustomerService => "customer-service",
        }
    }
}

/// An employee that has not been persisted yet.
///
/// `employee_id` is normally left empty and filled in by the allocator
/// inside the registering transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEmployee {
    /// Pre-assigned employee number, if any.
    pub employee_id: Option<ExternalId>,
    /// Display name.
    pub full_name: String,
    /// Login email; unique across employees.
    pub email: String,
    /// Recorded gender.
    pub gender: Option<Gender>,
    /// Job position.
    pub position: Option<Position>,
    /// Department.
    pub department: Option<Department>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// First day of employment; today when not given.
    pub employment_date: Option<NaiveDate>,
    /// Contact phone number.
    pub phone_number: String,
    /// Postal address.
    pub address: String,
}

impl IdentifiedRecord for NewEmployee {
    const TABLE: &'static str = EMPLOYEES;

    fn external_id(&self) -> Option<&ExternalId> {
        self.employee_id.as_ref()
    }

    fn assign_external_id(&mut self, id: ExternalId) {
        self.employee_id = Some(id);
    }
}

/// A persisted employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Internal key.
    pub id: u64,
    /// Employee number. Only rows written outside the roster lack one.
    pub employee_id: Option<ExternalId>,
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Recorded gender.
    pub gender: Option<Gender>,
    /// Job position.
    pub position: Option<Position>,
    /// Department.
    pub department: Option<Department>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// First day of employment.
    pub employment_date: NaiveDate,
    /// Contact phone number.
    pub phone_number: String,
    /// Postal address.
    pub address: String,
    /// Day the employee was archived. Archived rows are kept so their
    /// numbers are never handed out again.
    pub archived_on: Option<NaiveDate>,
}

impl IdentifiedRecord for Employee {
    const TABLE: &'static str = EMPLOYEES;

    fn external_id(&self) -> Option<&ExternalId> {
        self.employee_id.as_ref()
    }

    fn assign_external_id(&mut self, id: ExternalId) {
        self.employee_id = Some(id);
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.employee_id {
            Some(id) => write!(f, "{} ({id})", self.full_name),
            None => write!(f, "{} (#{})", self.full_name, self.id),
        }
    }
}
