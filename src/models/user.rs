use diesel::prelude::*;
use jiff::civil;

/// User row as read from the database
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub dob: jiff_diesel::Date,
}

impl User {
    pub fn new(id: i32, name: impl Into<String>, dob: civil::Date) -> Self {
        Self {
            id,
            name: name.into(),
            dob: dob.into(),
        }
    }

    pub fn dob(&self) -> civil::Date {
        self.dob.into()
    }
}

/// Values for inserting a new row; the id is assigned by the database
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub name: String,
    pub dob: jiff_diesel::Date,
}

impl NewUser {
    pub fn new(name: impl Into<String>, dob: civil::Date) -> Self {
        Self {
            name: name.into(),
            dob: dob.into(),
        }
    }
}

/// Full replacement of the mutable columns
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub name: String,
    pub dob: jiff_diesel::Date,
}

impl UserChanges {
    pub fn new(name: impl Into<String>, dob: civil::Date) -> Self {
        Self {
            name: name.into(),
            dob: dob.into(),
        }
    }
}
