use rocket::{Build, Rocket, Route};

use crate::resp::problem::{problems, Problem};

pub mod auth;
pub mod bookings;
pub mod materials;
pub mod notes;
pub mod payments;
pub mod reviews;
pub mod sessions;
pub mod tutors;
pub mod users;

use auth::*;
use bookings::*;
use materials::*;
use notes::*;
use payments::*;
use reviews::*;
use sessions::*;
use tutors::*;
use users::*;

pub fn api() -> Vec<Route> {
    routes![
        liveness,
        issue_token,
        logout,
        user_upsert,
        user_role,
        user_list,
        user_search,
        user_set_role,
        tutors_approved,
        tutors_pending,
        tutor_status,
        tutor_apply,
        session_create,
        session_list,
        session_get,
        session_delete,
        session_set_status,
        session_resubmit,
        booking_create,
        booking_list,
        review_create,
        review_list,
        payment_confirm,
        create_payment_intent,
        note_create,
        note_list,
        note_update,
        note_delete,
        material_create,
        material_list,
    ]
}

/// Bodies that fail `Json` deserialization surface as 422 from the data
/// guard; the API treats them as plain bad input.
#[catch(422)]
pub fn malformed_body() -> Problem {
    problems::bad_input("Request body is malformed or missing required fields.")
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api())
        .register("/", catchers![malformed_body])
}
