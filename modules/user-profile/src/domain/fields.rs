/// Names of the editable profile fields, as submitted and as reported back.
pub struct ProfileFields;

impl ProfileFields {
    pub const NAME: &'static str = "name";
    pub const EMAIL: &'static str = "email";
    pub const INTRODUCTION: &'static str = "introduction";
}
