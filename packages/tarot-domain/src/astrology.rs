use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthRecord {
	pub nome: String,
	/// `YYYY-MM-DD`.
	pub data_nascimento: String,
	/// `HH:MM`.
	pub hora_nascimento: String,
	/// Free text, usually `City, Country`.
	pub local_nascimento: String,
}

/// Integer view of a [`BirthRecord`], ready for the ephemeris service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthMoment {
	pub name: String,
	pub year: i32,
	pub month: u32,
	pub day: u32,
	pub hour: u32,
	pub minute: u32,
	pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
	pub signo: String,
	pub casa: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstrologyFacts {
	pub sol: Placement,
	pub lua: Placement,
	pub ascendente: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BirthRecordError {
	#[error("Birth date {0:?} is not in YYYY-MM-DD form.")]
	Date(String),
	#[error("Birth time {0:?} is not in HH:MM form.")]
	Time(String),
}

impl BirthMoment {
	/// Splits date and time into integers. Calendar validity is left to the ephemeris service.
	pub fn from_record(record: &BirthRecord) -> Result<Self, BirthRecordError> {
		let date_err = || BirthRecordError::Date(record.data_nascimento.clone());
		let time_err = || BirthRecordError::Time(record.hora_nascimento.clone());
		let mut date = record.data_nascimento.trim().split('-');
		let year = next_number(&mut date).ok_or_else(date_err)?;
		let month = next_number(&mut date).ok_or_else(date_err)?;
		let day = next_number(&mut date).ok_or_else(date_err)?;
		let mut time = record.hora_nascimento.trim().split(':');
		let hour = next_number(&mut time).ok_or_else(time_err)?;
		let minute = next_number(&mut time).ok_or_else(time_err)?;

		Ok(Self {
			name: record.nome.clone(),
			year,
			month,
			day,
			hour,
			minute,
			city: normalize_locality(&record.local_nascimento),
		})
	}
}

/// Rewrites the few Brazilian localities the ephemeris geocoder needs in English.
pub fn normalize_locality(locality: &str) -> String {
	if locality.contains("São Paulo") || locality.contains("Sao Paulo") {
		"Sao Paulo, Brazil".to_string()
	} else if locality.contains("Rio de Janeiro") {
		"Rio de Janeiro, Brazil".to_string()
	} else if locality.contains("Brasil") || locality.contains("Brazil") {
		locality.replace("Brasil", "Brazil")
	} else {
		locality.to_string()
	}
}

fn next_number<'a, I, T>(parts: &mut I) -> Option<T>
where
	I: Iterator<Item = &'a str>,
	T: std::str::FromStr,
{
	parts.next()?.trim().parse().ok()
}
