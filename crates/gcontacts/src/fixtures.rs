//! Feed payloads shared by tests.

pub(crate) const CONTACT_SET_JSON: &str = r#"{
  "version": "1.0",
  "encoding": "UTF-8",
  "feed": {
    "xmlns": "http://www.w3.org/2005/Atom",
    "id": { "$t": "example@gmail.com" },
    "updated": { "$t": "2011-07-07T21:02:42.360Z" },
    "title": { "type": "text", "$t": "Contacts" },
    "openSearch$totalResults": { "$t": "500" },
    "openSearch$startIndex": { "$t": "1" },
    "openSearch$itemsPerPage": { "$t": "25" },
    "entry": [
      {
        "id": { "$t": "http://www.google.com/m8/feeds/contacts/example%40gmail.com/base/0" },
        "gd$etag": "\"Rn8_fjVSLit7I2A9WhRWEkQOQwc.\"",
        "updated": { "$t": "2011-07-07T21:02:42.360Z" },
        "category": [
          { "scheme": "http://schemas.google.com/g/2005#kind", "term": "http://schemas.google.com/contact/2008#contact" }
        ],
        "title": { "type": "text", "$t": "Contact 1" },
        "content": { "type": "text", "$t": "Met at the conference" },
        "link": [
          {
            "rel": "http://schemas.google.com/contacts/2008/rel#photo",
            "type": "image/*",
            "href": "https://www.google.com/m8/feeds/photos/media/example%40gmail.com/0",
            "gd$etag": "\"dxt2DAEZfCp7ImA-AV4zRxBoPG4UK3owXBM.\""
          },
          {
            "rel": "self",
            "type": "application/atom+xml",
            "href": "https://www.google.com/m8/feeds/contacts/example%40gmail.com/full/0"
          },
          {
            "rel": "edit",
            "type": "application/atom+xml",
            "href": "https://www.google.com/m8/feeds/contacts/example%40gmail.com/full/0"
          }
        ],
        "gd$email": [
          { "rel": "http://schemas.google.com/g/2005#other", "address": "contact1@example.com", "primary": "true" }
        ],
        "gd$im": [
          { "address": "contact1@example.com", "protocol": "http://schemas.google.com/g/2005#GOOGLE_TALK", "rel": "http://schemas.google.com/g/2005#other" }
        ]
      },
      {
        "id": { "$t": "http://www.google.com/m8/feeds/contacts/example%40gmail.com/base/1" },
        "gd$etag": "\"Rn8_fjVSLit7I2A9WhRWEkQOQwd.\"",
        "updated": { "$t": "2011-07-07T21:02:42.360Z" },
        "title": { "type": "text", "$t": "Contact 2" },
        "link": [
          { "rel": "self", "type": "application/atom+xml", "href": "https://www.google.com/m8/feeds/contacts/example%40gmail.com/full/1" }
        ]
      },
      {
        "id": { "$t": "http://www.google.com/m8/feeds/contacts/example%40gmail.com/base/2" },
        "updated": { "$t": "2011-07-07T21:02:42.360Z" },
        "title": { "type": "text", "$t": "Contact 3" },
        "link": [],
        "gd$email": [
          { "rel": "http://schemas.google.com/g/2005#other", "address": "contact3@example.com" }
        ]
      }
    ]
  }
}"#;

pub(crate) const GROUP_SET_JSON: &str = r#"{
  "version": "1.0",
  "encoding": "UTF-8",
  "feed": {
    "id": { "$t": "example@gmail.com" },
    "openSearch$totalResults": { "$t": "5" },
    "openSearch$startIndex": { "$t": "1" },
    "openSearch$itemsPerPage": { "$t": "25" },
    "entry": [
      {
        "id": { "$t": "http://www.google.com/m8/feeds/groups/example%40gmail.com/base/6" },
        "updated": { "$t": "1970-01-01T00:00:00.000Z" },
        "title": { "$t": "System Group: My Contacts" },
        "content": { "$t": "System Group: My Contacts" },
        "link": [
          { "rel": "self", "type": "application/atom+xml", "href": "https://www.google.com/m8/feeds/groups/example%40gmail.com/full/6" }
        ],
        "gContact$systemGroup": { "id": "Contacts" }
      },
      {
        "id": { "$t": "http://www.google.com/m8/feeds/groups/example%40gmail.com/base/7cf4a3b30e2b9c55" },
        "gd$etag": "\"QXc8cDVSLyt7I2A9WhRWEkQOQwc.\"",
        "updated": { "$t": "2011-07-07T21:02:42.360Z" },
        "title": { "$t": "Friends" },
        "content": { "$t": "Friends" },
        "link": [
          { "rel": "self", "type": "application/atom+xml", "href": "https://www.google.com/m8/feeds/groups/example%40gmail.com/full/7cf4a3b30e2b9c55" },
          { "rel": "edit", "type": "application/atom+xml", "href": "https://www.google.com/m8/feeds/groups/example%40gmail.com/full/7cf4a3b30e2b9c55" }
        ]
      }
    ]
  }
}"#;

pub(crate) const EMPTY_CONTACT_SET_JSON: &str = r#"{
  "feed": {
    "openSearch$totalResults": { "$t": "0" },
    "openSearch$startIndex": { "$t": "1" },
    "openSearch$itemsPerPage": { "$t": "25" }
  }
}"#;

/// A contact exercising most derived fields.
pub(crate) const CONTACT_V3_JSON: &str = r#"{
  "id": { "$t": "http://www.google.com/m8/feeds/contacts/test.user%40gmail.com/base/6b70f8bb0372c" },
  "gd$etag": "\"SXk6cDdXKit7I2A9Wh9VFUgORgE.\"",
  "gd$name": {
    "gd$givenName": { "$t": "John" },
    "gd$familyName": { "$t": "Doe" },
    "gd$fullName": { "$t": "John Doe" }
  },
  "content": { "$t": "Likes tea" },
  "gContact$birthday": { "when": "1988-05-12" },
  "gContact$relation": [ { "$t": "Jane", "rel": "spouse" } ],
  "gd$structuredPostalAddress": [
    {
      "gd$country": { "$t": "United States of America" },
      "gd$formattedAddress": { "$t": "2345 Long Dr. #232\nSomwhere\nIL\n12345\nUnited States of America" },
      "gd$city": { "$t": "Somwhere" },
      "gd$street": { "$t": "2345 Long Dr. #232" },
      "gd$region": { "$t": "IL" },
      "gd$postcode": { "$t": "12345" }
    },
    {
      "rel": "http://schemas.google.com/g/2005#home",
      "primary": "true",
      "gd$country": { "$t": "United States of America" },
      "gd$formattedAddress": { "$t": "123 Far Ln.\nAnywhere\nMO\n67891\nUnited States of America" },
      "gd$city": { "$t": "Anywhere" },
      "gd$street": { "$t": "123 Far Ln." }
    }
  ],
  "gd$email": [
    { "primary": "true", "rel": "http://schemas.google.com/g/2005#other", "address": "johnsmith@example.com" }
  ],
  "gd$phoneNumber": [
    { "primary": "true", "$t": "(123) 334-5158", "rel": "http://schemas.google.com/g/2005#mobile" }
  ],
  "gd$organization": [
    {
      "gd$orgTitle": { "$t": "Worker Person" },
      "gd$orgName": { "$t": "Example, Inc" },
      "rel": "http://schemas.google.com/g/2005#other"
    }
  ],
  "gContact$website": [
    { "href": "http://www.example.com", "rel": "blog" }
  ],
  "gContact$groupMembershipInfo": [
    { "deleted": "false", "href": "http://www.google.com/m8/feeds/groups/test.user%40gmail.com/base/111" },
    { "deleted": "true", "href": "http://www.google.com/m8/feeds/groups/test.user%40gmail.com/base/222" }
  ]
}"#;

/// Batch response for three entries: created, updated, and failed.
pub(crate) const BATCH_RESPONSE_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns='http://www.w3.org/2005/Atom' xmlns:openSearch='http://a9.com/-/spec/opensearch/1.1/' xmlns:gContact='http://schemas.google.com/contact/2008' xmlns:batch='http://schemas.google.com/gdata/batch' xmlns:gd='http://schemas.google.com/g/2005'>
  <id>https://www.google.com/m8/feeds/contacts/default/full/batch/1409588734010</id>
  <updated>2014-09-01T16:25:34.010Z</updated>
  <title>Batch Feed</title>
  <entry gd:etag='"R3Y-fTVSLit7I2A9XRdREkQCRQM."'>
    <batch:id>0</batch:id>
    <batch:operation type='insert'/>
    <batch:status code='201' reason='Created'/>
    <id>http://www.google.com/m8/feeds/contacts/test.user%40gmail.com/base/1a2b</id>
    <updated>2014-09-01T16:25:34.010Z</updated>
    <title>John Doe</title>
    <link rel='self' type='application/atom+xml' href='https://www.google.com/m8/feeds/contacts/test.user%40gmail.com/full/1a2b'/>
    <gd:name>
      <gd:fullName>John Doe</gd:fullName>
      <gd:givenName>John</gd:givenName>
      <gd:familyName>Doe</gd:familyName>
    </gd:name>
    <gd:email rel='http://schemas.google.com/g/2005#work' address='john@example.com' primary='true'/>
  </entry>
  <entry gd:etag='"SHo6fzVSLit7I2A9XRdREkQCRQM."'>
    <batch:id>1</batch:id>
    <batch:operation type='update'/>
    <batch:status code='200' reason='Success'/>
    <id>http://www.google.com/m8/feeds/contacts/test.user%40gmail.com/base/3c4d</id>
    <updated>2014-09-01T16:25:34.010Z</updated>
    <title>Jane Doe</title>
    <gd:name>
      <gd:fullName>Jane Doe</gd:fullName>
      <gd:givenName>Jane</gd:givenName>
      <gd:familyName>Doe</gd:familyName>
    </gd:name>
  </entry>
  <entry>
    <batch:id>2</batch:id>
    <batch:operation type='insert'/>
    <batch:status code='500' reason='Internal Server Error'/>
    <id>https://www.google.com/m8/feeds/contacts/default/full/batch/1409588734010/2</id>
    <title>Fatal Error</title>
  </entry>
</feed>"#;
