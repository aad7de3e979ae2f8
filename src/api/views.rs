//! Response shapes and input pieces shared by several resources.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    domain::{Address, City, Province},
    errors::ApiError,
    service::{cities, provinces},
    store::Store,
};

/// `{id, name}` reference to another resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityView {
    pub id: u64,
    pub name: String,
    pub province: Province,
}

impl CityView {
    pub fn build(store: &Store, city: City) -> Result<Self, ApiError> {
        let province = provinces::find_or_fail(store, city.province_id)?;
        Ok(CityView {
            id: city.id,
            name: city.name,
            province,
        })
    }
}

/// City as embedded in an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySummary {
    pub id: u64,
    pub name: String,
    pub province: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressView {
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: CitySummary,
}

impl AddressView {
    pub fn build(store: &Store, address: Address) -> Result<Self, ApiError> {
        let city = cities::find_or_fail(store, address.city_id)?;
        let province = provinces::find_or_fail(store, city.province_id)?;
        Ok(AddressView {
            zip_code: address.zip_code,
            street: address.street,
            number: address.number,
            complement: address.complement,
            district: address.district,
            city: CitySummary {
                id: city.id,
                name: city.name,
                province: province.name,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AddressForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub zip_code: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub street: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city_id: u64,
}

impl From<AddressForm> for Address {
    fn from(f: AddressForm) -> Self {
        Address {
            zip_code: f.zip_code,
            street: f.street,
            number: f.number,
            complement: f.complement,
            district: f.district,
            city_id: f.city_id,
        }
    }
}
