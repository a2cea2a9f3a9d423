//! Shared fixtures for unit tests.
use dicom_core::{dicom_value, DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;

/// A data set with all attributes required of a reference file,
/// for patient `P1` and a study on 2024-01-01.
pub(crate) fn reference_object() -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    for (tag, vr, value) in [
        (tags::INSTANCE_CREATION_DATE, VR::DA, "20240101"),
        (tags::PATIENT_ID, VR::LO, "P1"),
        (tags::PATIENT_BIRTH_DATE, VR::DA, "19700101"),
        (tags::PATIENT_SEX, VR::CS, "O"),
        (tags::STUDY_DESCRIPTION, VR::LO, "Reference study"),
        (tags::STUDY_DATE, VR::DA, "20240101"),
        (tags::STUDY_TIME, VR::TM, "120000"),
        (tags::REFERRING_PHYSICIAN_NAME, VR::PN, "Doe^Jane"),
        (tags::STUDY_ID, VR::SH, "S1"),
        (tags::ACCESSION_NUMBER, VR::SH, "A1"),
        (tags::FRAME_OF_REFERENCE_UID, VR::UI, "1.2.3.4"),
    ] {
        obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
    }
    obj.put(DataElement::new(
        tags::IMAGE_ORIENTATION_PATIENT,
        VR::DS,
        dicom_value!(Strs, ["1", "0", "0", "0", "1", "0"]),
    ));
    obj
}
